#![no_std]

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod charset;
pub mod clock;
pub mod consts;
pub mod word;

pub use clock::{Clock, ManualClock};
#[cfg(feature = "std")]
pub use clock::SystemClock;
pub use word::{Sign, Word};
