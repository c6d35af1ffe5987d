//! Real-time clock trait

use super::InitError;
use crate::time::Timestamp;

/// Errors that can occur reading or setting the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// The clock did not respond at init
    Unavailable,
    /// Bus transaction failed
    Bus,
    /// The device reports that its oscillator stopped; time is untrustworthy
    IntegrityLost,
    /// The registers decoded to an out-of-range time
    InvalidTime,
}

/// Trait for a battery-backed real-time clock
pub trait Clock {
    /// Probe the device
    ///
    /// A clock that is simply missing is not an init error: it comes back
    /// `Ok` with [`Clock::is_available`] false, and the cycle degrades to
    /// showing an error instead of the time.
    fn init(&mut self) -> Result<(), InitError>;

    /// Read the current time
    ///
    /// Never returns a timestamp that fails [`Timestamp::is_valid`].
    fn now(&mut self) -> Result<Timestamp, ClockError>;

    /// Set the current time
    fn set_now(&mut self, time: Timestamp) -> Result<(), ClockError>;

    /// False if the clock is missing or dead
    fn is_available(&self) -> bool;
}
