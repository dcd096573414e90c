use std::path::{Path, PathBuf};

use vmix_core::consts::{geometry, latency};
use vmix_core::{Clock, Word};

use log::{debug, error};

use crate::media::{flush_mirror, load_mirror};
use crate::{DeviceState, IoDevice};

///
/// ## Disk
///
/// Random access disk unit. Shares the whole-file mirror policy of the
/// tape, but transfers never move the cursor. The block to transfer is
/// selected beforehand with `seek` or a control operation.
///
pub struct Disk<'a> {
    state: DeviceState<'a>,
    path: PathBuf,
}

impl<'a> Disk<'a> {
    pub fn new<P: AsRef<Path>>(path: P, clock: &'a dyn Clock) -> Self {
        let mut state = DeviceState::new(geometry::DISK, clock);
        load_mirror(path.as_ref(), state.data_mut());
        Self {
            state: state,
            path: path.as_ref().to_path_buf(),
        }
    }

    ///
    /// Positions the cursor on `page`.
    ///
    /// # Return Value
    ///
    ///  - `false` if `page` is not on the disk. The cursor is left as is.
    ///
    pub fn seek(&mut self, page: usize) -> bool {
        if page >= self.state.num_blocks() {
            error!("DISK: Seek to block {} is past the end of the disk", page);
            return false;
        }
        self.state.set_page(page);
        true
    }
}

impl<'a> IoDevice for Disk<'a> {
    fn state(&self) -> &DeviceState<'_> {
        &self.state
    }

    fn input(&mut self, buf: &mut [Word]) -> bool {
        let page = self.state.page();
        if !self.state.read_page(page, buf) {
            return false;
        }
        debug!("DISK: Read block {} from {:?}", page, self.path);
        self.state.mark_busy(latency::MEDIA_READ);
        true
    }

    fn output(&mut self, buf: &[Word]) -> bool {
        let page = self.state.page();
        if !self.state.write_page(page, buf) {
            return false;
        }
        debug!("DISK: Write block {} to {:?}", page, self.path);
        self.state.mark_busy(latency::MEDIA_WRITE);
        flush_mirror(&self.path, self.state.data());
        true
    }

    // The control operation positions the cursor on block `mode`.
    fn ioc(&mut self, mode: u32) -> bool {
        self.seek(mode as usize)
    }
}
