//! Battery gauge implementations

pub mod adc_battery;

pub use adc_battery::{AdcBattery, AdcBatteryConfig};
