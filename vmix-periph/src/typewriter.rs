use std::io::{ErrorKind, Read};

use vmix_core::charset::{self, NULLCHAR, SPACE};
use vmix_core::consts::{geometry, latency, FIELDS_PER_WORD};
use vmix_core::{Clock, Word};

use log::warn;

use crate::{DeviceState, IoDevice};

///
/// ## TypeWriter
///
/// Console keyboard. Reads a block of 14 words, 5 characters each, from an
/// input source owned by the caller.
///
/// A character without a MIX code (a newline, typically) ends the block: its
/// field is blanked and the remaining words of the block are zeroed. Running
/// out of input behaves the same way.
///
pub struct TypeWriter<'a> {
    state: DeviceState<'a>,
    input: &'a mut dyn Read,
    eof: bool,
}

impl<'a> TypeWriter<'a> {
    pub fn new(input: &'a mut dyn Read, clock: &'a dyn Clock) -> Self {
        Self {
            state: DeviceState::new(geometry::TYPEWRITER, clock),
            input: input,
            eof: false,
        }
    }

    /// True once the input source has run dry or failed to read.
    pub fn at_eof(&self) -> bool {
        self.eof
    }

    fn next_char(&mut self) -> u8 {
        let mut c = [0; 1];
        loop {
            match self.input.read(&mut c) {
                Ok(0) => {
                    self.eof = true;
                    return 0;
                }
                Ok(_) => return c[0],
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("TYPEWRITER: Unable to read input: {}", e);
                    self.eof = true;
                    return 0;
                }
            }
        }
    }
}

impl<'a> IoDevice for TypeWriter<'a> {
    fn state(&self) -> &DeviceState<'_> {
        &self.state
    }

    fn input(&mut self, buf: &mut [Word]) -> bool {
        self.state.mark_busy(latency::TYPEWRITER_READ);

        let block_size = self.state.block_size();
        let mut esc = false;
        for w in buf.iter_mut().take(block_size) {
            if esc {
                *w = Word::default();
                continue;
            }

            let mut fields = [SPACE; FIELDS_PER_WORD];
            for f in fields.iter_mut() {
                let v = charset::to_val(self.next_char());
                if v == NULLCHAR {
                    *f = SPACE;
                    esc = true;
                    break;
                }
                *f = v;
            }
            *w = Word::from_fields(fields);
        }
        true
    }
}
