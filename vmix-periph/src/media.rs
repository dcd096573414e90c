use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use vmix_core::Word;

use log::{debug, error, warn};

const BYTES_PER_WORD: usize = 4;

///
/// Fills `mirror` with the contents of the backing file at `path`. A missing
/// file leaves the mirror untouched, as does any read error. A short file
/// only fills the leading words.
///
pub fn load_mirror(path: &Path, mirror: &mut [Word]) {
    let body = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No backing file at {:?}. Starting blank", path);
            return;
        }
        Err(e) => {
            warn!("Unable to read backing file {:?}: {}", path, e);
            return;
        }
    };

    if body.len() != mirror.len() * BYTES_PER_WORD {
        warn!(
            "Backing file {:?} holds {} bytes, expected {}",
            path,
            body.len(),
            mirror.len() * BYTES_PER_WORD
        );
    }

    for (w, c) in mirror.iter_mut().zip(body.chunks_exact(BYTES_PER_WORD)) {
        *w = Word::from_bits(u32::from_le_bytes([c[0], c[1], c[2], c[3]]));
    }
}

///
/// Rewrites the whole backing file at `path` from `mirror`. Failures are
/// logged and otherwise ignored.
///
pub fn flush_mirror(path: &Path, mirror: &[Word]) {
    let mut body = Vec::with_capacity(mirror.len() * BYTES_PER_WORD);
    for w in mirror.iter() {
        body.extend_from_slice(&w.to_bits().to_le_bytes());
    }

    match fs::write(path, &body) {
        Err(e) => {
            error!("Unable to write backing file {:?}: {}", path, e);
        }
        _ => {}
    }
}
