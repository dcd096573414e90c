use std::path::{Path, PathBuf};

use vmix_core::consts::{geometry, latency};
use vmix_core::{Clock, Word};

use log::debug;

use crate::media::{flush_mirror, load_mirror};
use crate::{DeviceState, IoDevice};

///
/// ## Tape
///
/// Sequential magnetic tape unit. The whole tape is mirrored in memory and
/// loaded from the backing file on construction. Every transfer moves the
/// cursor forward by one block; there is no rewind.
///
pub struct Tape<'a> {
    state: DeviceState<'a>,
    path: PathBuf,
}

impl<'a> Tape<'a> {
    pub fn new<P: AsRef<Path>>(path: P, clock: &'a dyn Clock) -> Self {
        let mut state = DeviceState::new(geometry::TAPE, clock);
        load_mirror(path.as_ref(), state.data_mut());
        Self {
            state: state,
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl<'a> IoDevice for Tape<'a> {
    fn state(&self) -> &DeviceState<'_> {
        &self.state
    }

    fn input(&mut self, buf: &mut [Word]) -> bool {
        let page = self.state.page();
        if !self.state.read_page(page, buf) {
            return false;
        }
        debug!("TAPE: Read block {} from {:?}", page, self.path);
        self.state.mark_busy(latency::MEDIA_READ);
        self.state.advance_page();
        true
    }

    fn output(&mut self, buf: &[Word]) -> bool {
        let page = self.state.page();
        if !self.state.write_page(page, buf) {
            return false;
        }
        debug!("TAPE: Write block {} to {:?}", page, self.path);
        self.state.mark_busy(latency::MEDIA_WRITE);
        flush_mirror(&self.path, self.state.data());
        self.state.advance_page();
        true
    }
}
