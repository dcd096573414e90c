mod device;

pub mod card;
pub mod channel;
pub mod disk;
mod media;
pub mod paper;
pub mod printer;
pub mod tape;
pub mod typewriter;

pub use card::{CardReader, CardWriter};
pub use channel::{Channel, IoCompletion, IoOp, IoRequest};
pub use device::DeviceState;
pub use disk::Disk;
pub use paper::PaperTape;
pub use printer::LinePrinter;
pub use tape::Tape;
pub use typewriter::TypeWriter;

use vmix_core::Word;

///
/// ## IoDevice
///
/// Interface the channel uses to drive a peripheral. A device only overrides
/// the operations it supports; the rest report `false`, which the driver must
/// read as "not supported by this unit".
///
/// Every successful `input`/`output` leaves the device busy for a time
/// proportional to its block size. Drivers are expected to poll `busy` before
/// issuing the next operation.
///
pub trait IoDevice {
    fn state(&self) -> &DeviceState<'_>;

    fn input(&mut self, _buf: &mut [Word]) -> bool {
        false
    }

    fn output(&mut self, _buf: &[Word]) -> bool {
        false
    }

    fn ioc(&mut self, _mode: u32) -> bool {
        false
    }

    fn busy(&self) -> bool {
        self.state().busy()
    }

    fn busy_until(&self) -> u64 {
        self.state().busy_until()
    }

    fn block_size(&self) -> usize {
        self.state().block_size()
    }

    fn num_blocks(&self) -> usize {
        self.state().num_blocks()
    }

    fn page(&self) -> usize {
        self.state().page()
    }

    /// Number of words moved by a single `input`/`output` call.
    fn transfer_words(&self) -> usize {
        self.block_size()
    }
}
