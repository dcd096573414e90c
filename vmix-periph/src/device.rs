use core::ops::Range;

use vmix_core::{Clock, Word};

use log::{error, warn};

///
/// ## DeviceState
///
/// State shared by every peripheral: its geometry, page cursor, busy-until
/// timestamp and the backing buffer of `block_size * num_blocks` words. The
/// buffer is allocated once and never resized.
///
pub struct DeviceState<'a> {
    block_size: usize,
    num_blocks: usize,
    cur_page: usize,
    busy_until: u64,
    data: Vec<Word>,
    clock: &'a dyn Clock,
}

impl<'a> DeviceState<'a> {
    pub fn new(geometry: (usize, usize), clock: &'a dyn Clock) -> Self {
        let (block_size, num_blocks) = geometry;
        Self {
            block_size: block_size,
            num_blocks: num_blocks,
            cur_page: 0,
            busy_until: 0,
            data: vec![Word::default(); block_size * num_blocks],
            clock: clock,
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    pub fn page(&self) -> usize {
        self.cur_page
    }

    pub fn set_page(&mut self, page: usize) {
        self.cur_page = page;
    }

    pub fn advance_page(&mut self) {
        self.cur_page += 1;
    }

    pub fn busy_until(&self) -> u64 {
        self.busy_until
    }

    pub fn busy(&self) -> bool {
        self.clock.now_ms() < self.busy_until
    }

    ///
    /// Marks the device as busy for one block worth of transfer, `latency`
    /// being the cost of a single word in milliseconds.
    ///
    pub fn mark_busy(&mut self, latency: u64) {
        self.busy_until = self.clock.now_ms() + self.block_size as u64 * latency;
    }

    pub fn data(&self) -> &[Word] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [Word] {
        &mut self.data
    }

    fn page_range(&self, page: usize) -> Option<Range<usize>> {
        if page >= self.num_blocks {
            error!(
                "Page {} is outside of the device ({} blocks)",
                page, self.num_blocks
            );
            return None;
        }
        let start = page * self.block_size;
        Some(start..start + self.block_size)
    }

    fn check_buffer(&self, len: usize) {
        if len != self.block_size {
            warn!(
                "Transfer buffer holds {} words, block is {} words",
                len, self.block_size
            );
        }
    }

    ///
    /// Copies block `page` of the backing buffer into `dst`.
    ///
    /// # Return Value
    ///
    ///  - `false` if `page` is out of range, in which case nothing is copied.
    ///
    pub fn read_page(&self, page: usize, dst: &mut [Word]) -> bool {
        self.check_buffer(dst.len());
        match self.page_range(page) {
            Some(range) => {
                for (d, s) in dst.iter_mut().zip(self.data[range].iter()) {
                    *d = *s;
                }
                true
            }
            None => false,
        }
    }

    ///
    /// Copies `src` into block `page` of the backing buffer.
    ///
    /// # Return Value
    ///
    ///  - `false` if `page` is out of range, in which case nothing is copied.
    ///
    pub fn write_page(&mut self, page: usize, src: &[Word]) -> bool {
        self.check_buffer(src.len());
        match self.page_range(page) {
            Some(range) => {
                for (d, s) in self.data[range].iter_mut().zip(src.iter()) {
                    *d = *s;
                }
                true
            }
            None => false,
        }
    }
}
