use core::ops::Range;

use heapless::Deque;

use vmix_core::consts::unit::UNIT_COUNT;
use vmix_core::Word;

use log::{debug, error};

use crate::IoDevice;

pub const CHANNEL_QUEUE_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    In,
    Out,
    Ioc(u32),
}

///
/// A single operation for a unit. `addr` is the first memory word of the
/// transfer and is ignored for control operations.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoRequest {
    pub unit: usize,
    pub op: IoOp,
    pub addr: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoCompletion {
    pub request: IoRequest,
    pub ok: bool,
}

///
/// ## Channel
///
/// Drives the peripheral units on behalf of the CPU. Requests are queued in
/// order and the front request is only issued once its unit stops being
/// busy, so operations are performed in the order they were submitted.
///
/// Units follow the MIX numbering: 0-7 tapes, 8-15 disks, 16 card reader,
/// 17 card punch, 18 line printer, 19 typewriter and 20 paper tape.
///
pub struct Channel<'a> {
    units: Vec<Option<Box<dyn IoDevice + 'a>>>,
    pending: Deque<IoRequest, CHANNEL_QUEUE_LEN>,
}

impl<'a> Channel<'a> {
    pub fn new() -> Self {
        Self {
            units: (0..UNIT_COUNT).map(|_| None).collect(),
            pending: Deque::new(),
        }
    }

    pub fn attach(&mut self, unit: usize, device: Box<dyn IoDevice + 'a>) -> bool {
        match self.units.get_mut(unit) {
            Some(slot) => {
                *slot = Some(device);
                true
            }
            None => {
                error!("CHANNEL: Unit {} does not exist", unit);
                false
            }
        }
    }

    pub fn detach(&mut self, unit: usize) -> Option<Box<dyn IoDevice + 'a>> {
        self.units.get_mut(unit).and_then(|slot| slot.take())
    }

    pub fn device(&self, unit: usize) -> Option<&(dyn IoDevice + 'a)> {
        match self.units.get(unit) {
            Some(Some(dev)) => Some(&**dev),
            _ => None,
        }
    }

    pub fn busy(&self, unit: usize) -> bool {
        match self.device(unit) {
            Some(dev) => dev.busy(),
            None => false,
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_full(&self) -> bool {
        self.pending.is_full()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    ///
    /// Time at which the unit of the front request stops being busy, if
    /// there is a front request waiting on an attached unit.
    ///
    pub fn ready_at(&self) -> Option<u64> {
        let req = self.pending.front()?;
        self.device(req.unit).map(|dev| dev.busy_until())
    }

    ///
    /// Queues `req` behind the pending requests.
    ///
    /// # Return Value
    ///
    ///  - `false` if the queue is full. The request is dropped.
    ///
    pub fn submit(&mut self, req: IoRequest) -> bool {
        match self.pending.push_back(req) {
            Err(x) => {
                error!("CHANNEL: Unable to queue {:?}", x);
                false
            }
            _ => true,
        }
    }

    ///
    /// Issues the front request if its unit is ready.
    ///
    /// # Arguments
    ///
    ///  - `memory` - Memory image the transfers read from and write to.
    ///
    /// # Return Value
    ///
    ///  - `None` when nothing was issued (empty queue, or busy unit).
    ///  - The completion of the issued request otherwise. `ok` is false when
    ///    the unit is missing, the memory window is invalid or the device
    ///    refused the operation.
    ///
    pub fn step(&mut self, memory: &mut [Word]) -> Option<IoCompletion> {
        let req = *self.pending.front()?;

        let dev = match self.units.get_mut(req.unit).and_then(|slot| slot.as_mut()) {
            Some(dev) => dev,
            None => {
                error!("CHANNEL: No device attached to unit {}", req.unit);
                self.pending.pop_front();
                return Some(IoCompletion {
                    request: req,
                    ok: false,
                });
            }
        };

        if dev.busy() {
            return None;
        }
        self.pending.pop_front();

        let ok = match req.op {
            IoOp::Ioc(mode) => dev.ioc(mode),
            IoOp::In => match transfer_window(memory.len(), req.addr, &**dev) {
                Some(range) => dev.input(&mut memory[range]),
                None => false,
            },
            IoOp::Out => match transfer_window(memory.len(), req.addr, &**dev) {
                Some(range) => dev.output(&memory[range]),
                None => false,
            },
        };

        debug!("CHANNEL: {:?} -> {}", req, ok);
        Some(IoCompletion {
            request: req,
            ok: ok,
        })
    }
}

///
/// Memory words a transfer for `dev` starting at `addr` covers. At least one
/// full block has to fit in memory. Devices that move more than one block
/// per call get whatever part of their transfer fits.
///
fn transfer_window(mem_len: usize, addr: usize, dev: &dyn IoDevice) -> Option<Range<usize>> {
    match addr.checked_add(dev.block_size()) {
        Some(block_end) if block_end <= mem_len => {}
        _ => {
            error!(
                "CHANNEL: Transfer of {} words at {} is outside of memory",
                dev.block_size(),
                addr
            );
            return None;
        }
    }
    let end = match addr.checked_add(dev.transfer_words()) {
        Some(x) => core::cmp::min(x, mem_len),
        None => mem_len,
    };
    Some(addr..end)
}

// ============================================================================
// Module Tests
// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Disk, LinePrinter, PaperTape, Tape};
    use tempfile::TempDir;
    use vmix_core::consts::unit;
    use vmix_core::consts::MEMORY_NUM_WORDS;
    use vmix_core::ManualClock;

    fn memory() -> Vec<Word> {
        vec![Word::default(); MEMORY_NUM_WORDS]
    }

    #[test]
    fn requests_wait_for_busy_units() {
        let dir = TempDir::new().unwrap();
        let clock = ManualClock::new();
        let mut channel = Channel::new();
        assert!(channel.attach(0, Box::new(Tape::new(dir.path().join("t.dat"), &clock))));

        let mut mem = memory();
        for w in mem[..100].iter_mut() {
            *w = Word::positive(42);
        }

        let out = IoRequest { unit: 0, op: IoOp::Out, addr: 0 };
        assert!(channel.submit(out));
        assert!(channel.submit(out));

        assert_eq!(Some(IoCompletion { request: out, ok: true }), channel.step(&mut mem));
        assert!(channel.busy(0));
        assert_eq!(Some(15000), channel.ready_at());

        // Second write has to wait for the first one to finish
        assert_eq!(None, channel.step(&mut mem));
        assert_eq!(1, channel.pending());
        clock.advance(15000);
        assert_eq!(Some(IoCompletion { request: out, ok: true }), channel.step(&mut mem));
        assert!(channel.is_idle());
        assert_eq!(None, channel.step(&mut mem));
        assert_eq!(Some(2), channel.device(0).map(|d| d.page()));
    }

    #[test]
    fn disk_is_positioned_by_control() {
        let dir = TempDir::new().unwrap();
        let clock = ManualClock::new();
        let mut channel = Channel::new();
        assert!(channel.attach(
            unit::DISK_FIRST,
            Box::new(Disk::new(dir.path().join("d.dat"), &clock))
        ));

        let mut mem = memory();
        mem[1000] = Word::positive(77);
        let reqs = [
            IoRequest { unit: unit::DISK_FIRST, op: IoOp::Ioc(5), addr: 0 },
            IoRequest { unit: unit::DISK_FIRST, op: IoOp::Out, addr: 1000 },
            IoRequest { unit: unit::DISK_FIRST, op: IoOp::In, addr: 2000 },
        ];
        for r in reqs.iter() {
            assert!(channel.submit(*r));
        }

        while !channel.is_idle() {
            match channel.step(&mut mem) {
                Some(c) => assert!(c.ok),
                None => clock.set(channel.ready_at().unwrap()),
            }
        }
        assert_eq!(Word::positive(77), mem[2000]);
        assert_eq!(Some(5), channel.device(unit::DISK_FIRST).map(|d| d.page()));
    }

    #[test]
    fn bad_requests_complete_with_failure() {
        let clock = ManualClock::new();
        let mut stray: Vec<u8> = Vec::new();
        let mut sink: Vec<u8> = Vec::new();
        let mut channel = Channel::new();
        assert!(!channel.attach(unit::UNIT_COUNT, Box::new(LinePrinter::new(&mut stray, &clock))));
        assert!(channel.attach(unit::LINE_PRINTER, Box::new(LinePrinter::new(&mut sink, &clock))));

        let mut mem = memory();
        let reqs = [
            IoRequest { unit: unit::CARD_READER, op: IoOp::In, addr: 0 },
            IoRequest { unit: unit::LINE_PRINTER, op: IoOp::In, addr: 0 },
            IoRequest { unit: unit::LINE_PRINTER, op: IoOp::Out, addr: MEMORY_NUM_WORDS - 10 },
        ];
        for r in reqs.iter() {
            assert!(channel.submit(*r));
            assert_eq!(Some(IoCompletion { request: *r, ok: false }), channel.step(&mut mem));
        }
        assert!(!channel.busy(unit::LINE_PRINTER));
    }

    #[test]
    fn huge_address_is_rejected() {
        let dir = TempDir::new().unwrap();
        let clock = ManualClock::new();
        let mut channel = Channel::new();
        assert!(channel.attach(0, Box::new(Tape::new(dir.path().join("t.dat"), &clock))));

        let mut mem = memory();
        let reqs = [
            IoRequest { unit: 0, op: IoOp::In, addr: usize::MAX - 10 },
            IoRequest { unit: 0, op: IoOp::Out, addr: usize::MAX },
        ];
        for r in reqs.iter() {
            assert!(channel.submit(*r));
            assert_eq!(Some(IoCompletion { request: *r, ok: false }), channel.step(&mut mem));
        }
        assert!(!channel.busy(0));
        assert_eq!(Some(0), channel.device(0).map(|d| d.page()));
    }

    #[test]
    fn queue_is_bounded() {
        let mut channel = Channel::new();
        let req = IoRequest { unit: 0, op: IoOp::In, addr: 0 };
        for _ in 0..CHANNEL_QUEUE_LEN {
            assert!(channel.submit(req));
        }
        assert!(channel.is_full());
        assert!(!channel.submit(req));
    }

    #[test]
    fn paper_tape_gets_the_rest_of_memory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("p.pt");
        let clock = ManualClock::new();
        let mut channel = Channel::new();
        assert!(channel.attach(unit::PAPER_TAPE, Box::new(PaperTape::new(&path, &clock))));

        let mut mem = memory();
        mem[MEMORY_NUM_WORDS - 1] = Word::from_fields([1; 5]);
        let req = IoRequest { unit: unit::PAPER_TAPE, op: IoOp::Out, addr: MEMORY_NUM_WORDS - 14 };
        assert!(channel.submit(req));
        assert_eq!(Some(IoCompletion { request: req, ok: true }), channel.step(&mut mem));

        let body = std::fs::read(&path).unwrap();
        assert_eq!(14000 * 5, body.len());
        assert_eq!(b"AAAAA", &body[13 * 5..14 * 5]);
    }
}
