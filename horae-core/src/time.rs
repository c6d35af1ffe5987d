//! Time, battery and touch value types
//!
//! Snapshots read from devices once per cycle. None of these carry a
//! timezone or survive a power cycle.

/// Wall-clock time as kept by the RTC
///
/// Local to the device, no timezone. A value read from a clock that fails
/// [`Timestamp::is_valid`] means the clock is faulty or was never set; it is
/// never clamped into range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp {
    /// Full year (e.g. 2024)
    pub year: u16,
    /// Month, 1-12
    pub month: u8,
    /// Day of month, 1-31
    pub day: u8,
    /// Hour, 0-23
    pub hour: u8,
    /// Minute, 0-59
    pub minute: u8,
    /// Second, 0-59
    pub second: u8,
}

impl Timestamp {
    /// Create a timestamp from its fields without validation
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Check that every field is in range
    pub fn is_valid(&self) -> bool {
        (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day)
            && self.hour <= 23
            && self.minute <= 59
            && self.second <= 59
    }

    /// Check that the time is valid and not older than `min_year`
    ///
    /// Network time services answer with the epoch (1970) until they have
    /// actually synchronized, so a floor on the year separates a real answer
    /// from a placeholder.
    pub fn is_plausible(&self, min_year: u16) -> bool {
        self.is_valid() && self.year >= min_year
    }
}

/// Battery charge snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BatteryLevel {
    /// State of charge, 0-100 %
    Percent(u8),
    /// The gauge could not produce a reading
    Unknown,
}

impl BatteryLevel {
    /// Build a level from a gauge reading
    ///
    /// Anything above 100 % is a gauge fault and maps to `Unknown`.
    pub fn from_percent(percent: u8) -> Self {
        if percent <= 100 {
            BatteryLevel::Percent(percent)
        } else {
            BatteryLevel::Unknown
        }
    }

    /// Percentage if known
    pub fn percent(&self) -> Option<u8> {
        match self {
            BatteryLevel::Percent(p) => Some(*p),
            BatteryLevel::Unknown => None,
        }
    }
}

/// A touch position in device pixels
///
/// Only meaningful while the touch device reported a touch in the same poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchPoint {
    pub x: i32,
    pub y: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_timestamp() {
        assert!(Timestamp::new(2024, 1, 1, 0, 0, 0).is_valid());
        assert!(Timestamp::new(2024, 12, 31, 23, 59, 59).is_valid());
    }

    #[test]
    fn test_out_of_range_fields_are_invalid() {
        assert!(!Timestamp::new(2024, 0, 1, 0, 0, 0).is_valid());
        assert!(!Timestamp::new(2024, 13, 1, 0, 0, 0).is_valid());
        assert!(!Timestamp::new(2024, 1, 0, 0, 0, 0).is_valid());
        assert!(!Timestamp::new(2024, 1, 1, 24, 0, 0).is_valid());
        assert!(!Timestamp::new(2024, 1, 1, 0, 60, 0).is_valid());
        assert!(!Timestamp::new(2024, 1, 1, 0, 0, 60).is_valid());
        // An uninitialized RTC often reads all zeros
        assert!(!Timestamp::default().is_valid());
    }

    #[test]
    fn test_plausible_needs_recent_year() {
        let t = Timestamp::new(1970, 1, 1, 8, 0, 3);
        assert!(t.is_valid());
        assert!(!t.is_plausible(2022));
        assert!(Timestamp::new(2022, 6, 1, 8, 0, 3).is_plausible(2022));
    }

    #[test]
    fn test_battery_level_from_percent() {
        assert_eq!(BatteryLevel::from_percent(0), BatteryLevel::Percent(0));
        assert_eq!(BatteryLevel::from_percent(100), BatteryLevel::Percent(100));
        assert_eq!(BatteryLevel::from_percent(101), BatteryLevel::Unknown);
        assert_eq!(BatteryLevel::Unknown.percent(), None);
        assert_eq!(BatteryLevel::Percent(42).percent(), Some(42));
    }
}
