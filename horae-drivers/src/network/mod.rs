//! Network implementations

pub mod at;
pub mod esp_at;

pub use esp_at::{EspAtConfig, EspAtNetwork};
