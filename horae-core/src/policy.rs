//! Redraw, resync and sleep policy
//!
//! Pure functions so the decisions the cycle controller makes can be tested
//! without any devices.

use core::fmt::Write;

use heapless::String;

use crate::time::{BatteryLevel, Timestamp};

/// Shortest sleep the controller will ever request
pub const MIN_SLEEP_S: u32 = 1;

/// Seconds in a minute, and the longest sleep computed from the clock
pub const MINUTE_S: u32 = 60;

/// Text shown by the battery indicator when the level is unknown
pub const BATTERY_UNKNOWN_TEXT: &str = "bat:---";

/// Formatted clock face ("HH:MM")
pub type ClockText = String<5>;

/// Formatted battery indicator ("bat:NNN")
pub type BatteryText = String<7>;

/// How much of the panel a render cycle wipes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RedrawScope {
    /// Clear the whole panel, bounding ghosting
    Full,
    /// Erase only the clock region
    Partial,
}

/// True when the clock should be resynchronized from the network
///
/// # Arguments
/// * `now` - Time read at the start of the cycle
/// * `hour`, `minute` - Configured resync time of day
pub fn resync_due(now: &Timestamp, hour: u8, minute: u8) -> bool {
    now.hour == hour && now.minute == minute
}

/// Pick the redraw scope for the current minute
///
/// A full clear happens whenever `minute` is a multiple of `every_min`.
/// `every_min == 0` turns periodic full clears off.
pub fn redraw_scope(minute: u8, every_min: u8) -> RedrawScope {
    if every_min != 0 && minute % every_min == 0 {
        RedrawScope::Full
    } else {
        RedrawScope::Partial
    }
}

/// True when the battery indicator must be drawn
///
/// `previous` is the level currently on the panel, `None` if nothing is.
/// A full clear wipes the indicator, so the controller passes `None` after
/// one and an unchanged level is redrawn on those minutes.
pub fn battery_needs_redraw(previous: Option<BatteryLevel>, current: BatteryLevel) -> bool {
    previous != Some(current)
}

/// Seconds to sleep so the next wake lands on a minute boundary
///
/// With a readable clock this is `60 - second`, so second 0 sleeps a whole
/// minute rather than zero seconds. Without one, `fallback_s` (at least 1).
pub fn sleep_seconds(second: Option<u8>, fallback_s: u16) -> u32 {
    match second {
        Some(s) if (s as u32) < MINUTE_S => MINUTE_S - s as u32,
        _ => (fallback_s as u32).max(MIN_SLEEP_S),
    }
}

/// Format the clock face as zero-padded 24-hour `HH:MM`
pub fn format_clock(now: &Timestamp) -> ClockText {
    let mut text = ClockText::new();
    // Fits for any valid timestamp; the controller never renders others
    let _ = write!(text, "{:02}:{:02}", now.hour % 24, now.minute % 60);
    text
}

/// Format the battery indicator as `bat:NNN`, or `bat:---` when unknown
pub fn format_battery(level: BatteryLevel) -> BatteryText {
    let mut text = BatteryText::new();
    match level.percent() {
        Some(p) => {
            let _ = write!(text, "bat:{:03}", p.min(100));
        }
        None => {
            let _ = text.push_str(BATTERY_UNKNOWN_TEXT);
        }
    }
    text
}
