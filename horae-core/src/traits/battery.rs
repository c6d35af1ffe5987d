//! Battery gauge trait

use super::InitError;
use crate::time::BatteryLevel;

/// Trait for a battery state-of-charge gauge
pub trait Battery {
    /// Configure the gauge
    fn init(&mut self) -> Result<(), InitError>;

    /// Current state of charge
    ///
    /// Returns [`BatteryLevel::Unknown`] if the gauge cannot measure.
    fn level(&mut self) -> BatteryLevel;

    /// True while external power is charging the cell
    fn is_charging(&mut self) -> bool;
}
