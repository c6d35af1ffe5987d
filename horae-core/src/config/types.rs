//! Configuration type definitions
//!
//! Defaults reproduce the stock clock: resync at 02:00 from
//! `pool.ntp.org` in UTC+8, full refresh every ten minutes, wake on the
//! button only, clock face centred on a 400x300 panel.

use heapless::String;

use crate::layout::{Point, Region, Rotation};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum SSID length (802.11 limit)
pub const MAX_SSID_LEN: usize = 32;

/// Maximum WPA passphrase length
pub const MAX_PASSWORD_LEN: usize = 64;

/// Maximum NTP server host name length
pub const MAX_HOST_LEN: usize = 64;

/// Wi-Fi and network time settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NetworkConfig {
    /// Access point name
    pub ssid: String<MAX_SSID_LEN>,
    /// Access point passphrase
    pub password: String<MAX_PASSWORD_LEN>,
    /// NTP server host name
    pub ntp_server: String<MAX_HOST_LEN>,
    /// Offset of local time from UTC in whole hours
    pub utc_offset_hours: i8,
    /// Association attempts per resync
    pub connect_attempts: u8,
    /// Time queries per resync, two seconds apart
    pub sync_attempts: u8,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        let mut ssid = String::new();
        let _ = ssid.push_str("YOURSSID");
        let mut password = String::new();
        let _ = password.push_str("YOURPASSWD");
        let mut ntp_server = String::new();
        let _ = ntp_server.push_str("pool.ntp.org");
        Self {
            ssid,
            password,
            ntp_server,
            utc_offset_hours: 8,
            connect_attempts: 2,
            sync_attempts: 10,
        }
    }
}

/// Time of day at which the clock is resynchronized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResyncConfig {
    pub hour: u8,
    pub minute: u8,
}

impl Default for ResyncConfig {
    fn default() -> Self {
        Self { hour: 2, minute: 0 }
    }
}

/// Panel settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    /// Panel orientation
    pub rotation: Rotation,
    /// Clear the whole panel when the minute is a multiple of this
    ///
    /// 0 disables periodic full clears.
    pub full_refresh_every_min: u8,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            rotation: Rotation::Deg0,
            full_refresh_every_min: 10,
        }
    }
}

/// Where things are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayoutConfig {
    /// Area erased before redrawing the time; the text is drawn at its origin
    pub clock_region: Region,
    /// Top-left corner of the battery indicator
    pub battery_anchor: Point,
    /// Top-left corner of the clock error message
    pub error_anchor: Point,
    /// Top-left corner of suspend diagnostics
    pub diagnostic_anchor: Point,
}

impl LayoutConfig {
    /// Top-left corner of the clock face text
    pub fn clock_anchor(&self) -> Point {
        self.clock_region.origin()
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        // Large font is 40x80 per glyph, so "HH:MM" is 200x80
        Self {
            clock_region: Region::new(100, 110, 200, 80),
            battery_anchor: Point::new(322, 8),
            error_anchor: Point::new(0, 0),
            diagnostic_anchor: Point::new(0, 200),
        }
    }
}

/// Sleep and wake settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PowerConfig {
    /// Sleep length when the clock cannot be read
    pub fallback_sleep_s: u16,
    /// Arm the button as a wake source
    pub wake_on_button: bool,
    /// Arm the touch panel as a wake source
    pub wake_on_touch: bool,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            fallback_sleep_s: 60,
            wake_on_button: true,
            wake_on_touch: false,
        }
    }
}

/// Complete clock configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClockConfig {
    pub network: NetworkConfig,
    pub resync: ResyncConfig,
    pub display: DisplayConfig,
    pub layout: LayoutConfig,
    pub power: PowerConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClockConfig::default();
        assert_eq!(config.network.ssid.as_str(), "YOURSSID");
        assert_eq!(config.network.ntp_server.as_str(), "pool.ntp.org");
        assert_eq!(config.network.utc_offset_hours, 8);
        assert_eq!(config.resync, ResyncConfig { hour: 2, minute: 0 });
        assert_eq!(config.display.full_refresh_every_min, 10);
        assert_eq!(config.power.fallback_sleep_s, 60);
        assert!(config.power.wake_on_button);
        assert!(!config.power.wake_on_touch);
    }

    #[test]
    fn test_default_clock_fits_400x300() {
        let layout = LayoutConfig::default();
        let r = layout.clock_region;
        assert!(r.x >= 0 && r.x + r.w as i32 <= 400);
        assert!(r.y >= 0 && r.y + r.h as i32 <= 300);
        assert_eq!(layout.clock_anchor(), Point::new(100, 110));
    }
}
