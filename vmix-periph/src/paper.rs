use std::fs;
use std::path::{Path, PathBuf};

use vmix_core::charset;
use vmix_core::consts::{geometry, latency, FIELDS_PER_WORD};
use vmix_core::{Clock, Word};

use log::{debug, error};

use crate::{DeviceState, IoDevice};

///
/// ## PaperTape
///
/// Paper tape punch. Unlike the other units, a single `output` punches the
/// whole tape (`num_blocks * block_size` words), recreating the file each
/// time. Words missing from the caller's buffer are punched as zero words.
///
/// Fields are punched least significant first.
///
pub struct PaperTape<'a> {
    state: DeviceState<'a>,
    path: PathBuf,
}

impl<'a> PaperTape<'a> {
    pub fn new<P: AsRef<Path>>(path: P, clock: &'a dyn Clock) -> Self {
        Self {
            state: DeviceState::new(geometry::PAPER_TAPE, clock),
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl<'a> IoDevice for PaperTape<'a> {
    fn state(&self) -> &DeviceState<'_> {
        &self.state
    }

    fn transfer_words(&self) -> usize {
        self.state.block_size() * self.state.num_blocks()
    }

    fn output(&mut self, buf: &[Word]) -> bool {
        self.state.mark_busy(latency::PAPER_TAPE);

        let total = self.transfer_words();
        if buf.len() < total {
            debug!("PAPER: Padding {} words to {} words", buf.len(), total);
        }

        let mut body = Vec::with_capacity(total * FIELDS_PER_WORD);
        for idx in 0..total {
            let w = buf.get(idx).copied().unwrap_or_default();
            for k in (0..FIELDS_PER_WORD).rev() {
                body.push(charset::to_char(w.field(k)));
            }
        }

        match fs::write(&self.path, &body) {
            Err(e) => {
                error!("PAPER: Unable to punch {:?}: {}", self.path, e);
            }
            _ => {}
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use vmix_core::ManualClock;

    #[test]
    fn punches_whole_tape_reversed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tape.pt");
        let clock = ManualClock::new();
        let mut punch = PaperTape::new(&path, &clock);
        assert_eq!(14000, punch.transfer_words());

        let buf = [
            Word::from_fields([1, 2, 3, 4, 5]),
            Word::from_fields([30, 31, 32, 33, 34]),
        ];
        assert!(punch.output(&buf));
        assert!(punch.busy());
        assert_eq!(14 * 200, punch.busy_until());

        let body = fs::read(&path).unwrap();
        assert_eq!(14000 * 5, body.len());
        assert_eq!(b"EDCBA43210", &body[..10]);
        assert!(body[10..].iter().all(|c| *c == b' '));
    }

    #[test]
    fn every_punch_recreates_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tape.pt");
        let clock = ManualClock::new();
        let mut punch = PaperTape::new(&path, &clock);

        assert!(punch.output(&[Word::from_fields([1; 5]); 20]));
        assert!(punch.output(&[Word::from_fields([2; 5]); 1]));

        let body = fs::read(&path).unwrap();
        assert_eq!(14000 * 5, body.len());
        assert_eq!(b"BBBBB     ", &body[..10]);
        assert_eq!(0, punch.page());
    }

    #[test]
    fn failed_punch_still_completes() {
        let dir = TempDir::new().unwrap();
        let clock = ManualClock::new();
        let mut punch = PaperTape::new(dir.path().join("missing").join("p.pt"), &clock);

        assert!(punch.output(&[Word::positive(1); 14]));
        assert!(punch.busy());
        assert_eq!(14 * 200, punch.busy_until());
    }

    #[test]
    fn punch_cannot_read() {
        let dir = TempDir::new().unwrap();
        let clock = ManualClock::new();
        let mut punch = PaperTape::new(dir.path().join("p.pt"), &clock);
        let mut buf = [Word::default(); 14];
        assert!(!punch.input(&mut buf));
        assert!(!punch.ioc(0));
    }
}
