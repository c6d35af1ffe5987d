//! Configuration loading
//!
//! The clock configuration comes from the SD card if one is present and
//! carries a valid `HORAE.TOM`, otherwise from the `horae.toml` compiled
//! into the firmware.

pub mod loader;

pub use loader::{load_embedded, log_config_summary};
#[cfg(feature = "sdcard")]
pub use loader::load;
