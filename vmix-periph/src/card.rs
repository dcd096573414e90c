use std::fs;

use vmix_core::charset::{self, NULLCHAR, SPACE};
use vmix_core::consts::{geometry, latency, FIELDS_PER_WORD};
use vmix_core::{Clock, Word};

use log::{debug, error, warn};

use crate::{DeviceState, IoDevice};

const CARD_EXT: &str = ".card";

// Words are grouped on the card, a separator follows every fourth word
// (word indexes 4, 8 and 12).
fn ends_group(word_idx: usize) -> bool {
    word_idx > 0 && word_idx % 4 == 0
}

fn card_path(dir: &str, page: usize) -> String {
    format!("{}{}{}", dir, page, CARD_EXT)
}

// =============================================================================
//  Card Reader
// =============================================================================

///
/// ## CardReader
///
/// Reads one card per call from `<dir><page>.card` and moves to the next
/// card afterwards. `dir` is used as a plain prefix, so it normally ends with
/// a path separator.
///
pub struct CardReader<'a> {
    state: DeviceState<'a>,
    dir: String,
}

impl<'a> CardReader<'a> {
    pub fn new(dir: &str, clock: &'a dyn Clock) -> Self {
        Self {
            state: DeviceState::new(geometry::CARD_READER, clock),
            dir: dir.to_string(),
        }
    }
}

impl<'a> IoDevice for CardReader<'a> {
    fn state(&self) -> &DeviceState<'_> {
        &self.state
    }

    fn input(&mut self, buf: &mut [Word]) -> bool {
        self.state.mark_busy(latency::CARD_READ);

        let path = card_path(&self.dir, self.state.page());
        match fs::read(&path) {
            Ok(body) => {
                debug!("CARD: Reading {}", path);
                let mut chars = body.into_iter();
                let block_size = self.state.block_size();
                // Same grouped layout the punch writes, so punched decks read back
                for (idx, w) in buf.iter_mut().take(block_size).enumerate() {
                    let mut fields = [SPACE; FIELDS_PER_WORD];
                    for f in fields.iter_mut() {
                        // A short card reads as blanks
                        let v = charset::to_val(chars.next().unwrap_or(0));
                        *f = if v == NULLCHAR { SPACE } else { v };
                    }
                    *w = Word::from_fields(fields);

                    if ends_group(idx) {
                        chars.next();
                    }
                }
            }
            Err(e) => {
                warn!("CARD: Unable to read {}: {}", path, e);
            }
        }

        self.state.advance_page();
        true
    }
}

// =============================================================================
//  Card Writer
// =============================================================================

///
/// ## CardWriter
///
/// Punches one card per call into `<dir><page>.card`. The cursor is never
/// moved by the writer, so consecutive calls punch over the same card.
///
pub struct CardWriter<'a> {
    state: DeviceState<'a>,
    dir: String,
}

impl<'a> CardWriter<'a> {
    pub fn new(dir: &str, clock: &'a dyn Clock) -> Self {
        Self {
            state: DeviceState::new(geometry::CARD_WRITER, clock),
            dir: dir.to_string(),
        }
    }
}

impl<'a> IoDevice for CardWriter<'a> {
    fn state(&self) -> &DeviceState<'_> {
        &self.state
    }

    fn output(&mut self, buf: &[Word]) -> bool {
        self.state.mark_busy(latency::CARD_WRITE);

        let block_size = self.state.block_size();
        let mut body = Vec::with_capacity(block_size * (FIELDS_PER_WORD + 1));
        for block in buf.chunks(block_size).take(self.state.num_blocks()) {
            for (idx, w) in block.iter().enumerate() {
                for f in w.fields().iter() {
                    body.push(charset::to_char(*f));
                }

                if ends_group(idx) {
                    body.push(b'\n');
                }
            }
        }

        let path = card_path(&self.dir, self.state.page());
        debug!("CARD: Punching {}", path);
        match fs::write(&path, &body) {
            Err(e) => {
                error!("CARD: Unable to write {}: {}", path, e);
            }
            _ => {}
        }
        true
    }
}
