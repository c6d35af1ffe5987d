//! Configuration loading
//!
//! Reads the clock configuration from storage, falling back to the copy
//! embedded at build time. Both go through the same `no_std` parser.

use core::str;
use defmt::*;

use horae_core::config::{parse_config, ClockConfig, ParseError};
#[cfg(feature = "sdcard")]
use horae_core::traits::Storage;

/// Embedded default configuration (compiled into firmware)
/// Edit horae.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../../horae.toml");

/// Location of the override file on the card (8.3 name)
#[cfg(feature = "sdcard")]
pub const CONFIG_PATH: &str = "/HORAE.TOM";

/// Maximum TOML config size
#[cfg(feature = "sdcard")]
const MAX_TOML_SIZE: usize = 4096;

/// Configuration loading errors
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// No card, or no config file on it
    NotFound,
    /// File does not fit the read buffer
    TooLarge,
    /// Invalid UTF-8 in TOML data
    InvalidUtf8,
    /// TOML parsing failed
    TomlParse(ParseError),
}

impl From<ParseError> for ConfigError {
    fn from(e: ParseError) -> Self {
        ConfigError::TomlParse(e)
    }
}

/// Load configuration, preferring the file on `storage`
///
/// Never fails: anything wrong with the card or the file is logged and the
/// embedded configuration is used instead.
#[cfg(feature = "sdcard")]
pub fn load<S: Storage>(storage: &mut S) -> ClockConfig {
    info!("Loading configuration from SD card...");

    match load_from_storage(storage) {
        Ok(config) => {
            info!("Loaded configuration from {}", CONFIG_PATH);
            log_config_summary(&config);
            return config;
        }
        Err(ConfigError::NotFound) => {
            debug!("No config on card, using embedded defaults");
        }
        Err(e) => {
            warn!("Failed to load {}: {:?}, using embedded defaults", CONFIG_PATH, e);
        }
    }

    load_embedded()
}

#[cfg(feature = "sdcard")]
fn load_from_storage<S: Storage>(storage: &mut S) -> Result<ClockConfig, ConfigError> {
    storage.init().map_err(|_| ConfigError::NotFound)?;

    // One spare byte tells a full buffer from a file that is too big
    let mut buffer = [0u8; MAX_TOML_SIZE + 1];
    let len = storage
        .read_all(CONFIG_PATH, &mut buffer)
        .ok_or(ConfigError::NotFound)?;
    if len > MAX_TOML_SIZE {
        return Err(ConfigError::TooLarge);
    }

    debug!("Read {} bytes of TOML from card", len);

    let toml_str = str::from_utf8(&buffer[..len]).map_err(|_| ConfigError::InvalidUtf8)?;
    Ok(parse_config(toml_str)?)
}

/// Parse the configuration compiled into the firmware
///
/// build.rs has already validated it, so a parse failure here means the
/// build-time and on-target rules disagree; the built-in defaults are used.
pub fn load_embedded() -> ClockConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Loaded embedded configuration");
            log_config_summary(&config);
            config
        }
        Err(e) => {
            error!("Embedded config rejected: {:?}", e);
            ClockConfig::default()
        }
    }
}

/// Log a summary of the loaded configuration
pub fn log_config_summary(config: &ClockConfig) {
    info!("Configuration loaded successfully");
    debug!("  network: ssid={}", config.network.ssid.as_str());
    debug!(
        "  ntp: {} utc_offset={}",
        config.network.ntp_server.as_str(),
        config.network.utc_offset_hours
    );
    debug!(
        "  resync at {}:{}",
        config.resync.hour, config.resync.minute
    );
    debug!(
        "  rotation {} deg, full refresh every {} min",
        config.display.rotation.degrees(),
        config.display.full_refresh_every_min
    );
    debug!(
        "  wake: button={} touch={}, fallback sleep {} s",
        config.power.wake_on_button, config.power.wake_on_touch, config.power.fallback_sleep_s
    );
}
