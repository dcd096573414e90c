use std::io::Write;

use vmix_core::charset;
use vmix_core::consts::{geometry, latency, FIELDS_PER_WORD};
use vmix_core::{Clock, Word};

use log::error;

use crate::{DeviceState, IoDevice};

///
/// ## LinePrinter
///
/// Prints one line of 24 words (120 characters) per call onto a sink owned
/// by the caller. The printer never opens or closes the sink.
///
pub struct LinePrinter<'a> {
    state: DeviceState<'a>,
    out: &'a mut dyn Write,
}

impl<'a> LinePrinter<'a> {
    pub fn new(out: &'a mut dyn Write, clock: &'a dyn Clock) -> Self {
        Self {
            state: DeviceState::new(geometry::LINE_PRINTER, clock),
            out: out,
        }
    }
}

impl<'a> IoDevice for LinePrinter<'a> {
    fn state(&self) -> &DeviceState<'_> {
        &self.state
    }

    fn output(&mut self, buf: &[Word]) -> bool {
        self.state.mark_busy(latency::PRINT);

        let block_size = self.state.block_size();
        let mut line = Vec::with_capacity(block_size * FIELDS_PER_WORD + 1);
        for w in buf.iter().take(block_size) {
            for f in w.fields().iter() {
                line.push(charset::to_char(*f));
            }
        }
        line.push(b'\n');

        let res = self.out.write_all(&line).and_then(|_| self.out.flush());
        match res {
            Err(e) => {
                error!("PRINTER: Unable to print line: {}", e);
            }
            _ => {}
        }
        true
    }
}
