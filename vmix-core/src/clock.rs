use core::cell::Cell;

///
/// ## Clock
///
/// Millisecond time source used by devices to compute and check their
/// busy-until timestamps.
///
pub trait Clock {
    fn now_ms(&self) -> u64;
}

///
/// Clock that only moves when told to. Lets a driver (or a test) simulate
/// elapsed time without sleeping.
///
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new() -> ManualClock {
        ManualClock { now: Cell::new(0) }
    }

    pub fn set(&self, now_ms: u64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

#[cfg(feature = "std")]
pub struct SystemClock {
    start: std::time::Instant,
}

#[cfg(feature = "std")]
impl SystemClock {
    pub fn new() -> SystemClock {
        SystemClock {
            start: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}
