//! Power control implementations

pub mod latch;

pub use latch::{LatchPower, LatchPowerConfig};

use horae_core::traits::PowerError;

/// A timer that wakes the board once its countdown expires
///
/// Usually the RTC's countdown timer driving the power switch enable line.
pub trait WakeTimer {
    /// Start a countdown of `seconds`, replacing any armed one
    fn arm(&mut self, seconds: u32) -> Result<(), PowerError>;

    /// Stop the countdown and release the wake line
    fn disarm(&mut self) -> Result<(), PowerError>;
}
