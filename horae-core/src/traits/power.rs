//! Power control trait

use super::InitError;

/// Errors from arming a wake or powering down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerError {
    /// The wake timer could not be programmed
    TimerUnavailable,
    /// Requested duration is outside what the timer can count
    DurationOutOfRange,
    /// Power was released but the board is still running
    StillPowered,
}

/// Trait for the board's sleep and power switch
///
/// The sequence is: arm wake sources, [`PowerControl::sleep_for`], then
/// [`PowerControl::power_off`]. Code after `power_off` only runs if the
/// board failed to go down.
pub trait PowerControl {
    /// Take control of the power switch
    fn init(&mut self) -> Result<(), InitError>;

    /// Schedule a timed wake `seconds` from now
    fn sleep_for(&mut self, seconds: u32) -> Result<(), PowerError>;

    /// Cut power
    ///
    /// Only returns if powering down failed, with the reason.
    fn power_off(&mut self) -> PowerError;

    /// Let a touch wake the board
    fn enable_wake_on_touch(&mut self);

    /// Let the button wake the board
    fn enable_wake_on_button(&mut self);
}
