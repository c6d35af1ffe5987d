//! Single-cell Li-ion gauge on an ADC pin
//!
//! The cell voltage reaches the ADC through a resistive divider. State of
//! charge is estimated from the resting voltage with a lookup table, which is
//! good to a few percent for a clock that draws almost nothing between
//! refreshes.

use horae_core::traits::{Battery, InitError};
use horae_core::BatteryLevel;
use horae_hal::{AdcError, AdcInput, InputPin};

/// Li-ion discharge curve at low load
///
/// Table format: (cell_mv, percent), sorted by decreasing voltage.
const SOC_TABLE: &[(u32, u8)] = &[
    (4200, 100),
    (4150, 95),
    (4110, 90),
    (4080, 85),
    (4020, 80),
    (3980, 75),
    (3950, 70),
    (3910, 65),
    (3870, 60),
    (3850, 55),
    (3840, 50),
    (3820, 45),
    (3800, 40),
    (3790, 35),
    (3770, 30),
    (3750, 25),
    (3730, 20),
    (3710, 15),
    (3690, 10),
    (3610, 5),
    (3300, 0),
];

/// Below this the reading is not a connected cell (open divider, no battery)
const MIN_PLAUSIBLE_MV: u32 = 2500;

/// Gauge configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdcBatteryConfig {
    /// Divider ratio as numerator/denominator (cell_mv = pin_mv * num / den)
    pub divider_num: u16,
    pub divider_den: u16,
    /// Samples averaged per reading
    pub samples: u8,
    /// Charge-status pin reads low while charging
    pub charge_active_low: bool,
}

impl Default for AdcBatteryConfig {
    fn default() -> Self {
        Self {
            divider_num: 2,
            divider_den: 1,
            samples: 4,
            charge_active_low: true,
        }
    }
}

/// Battery gauge reading the cell voltage through an ADC
///
/// `C` is the charger status pin; pass [`horae_hal::gpio::NoPin`] on boards
/// without one.
pub struct AdcBattery<A, C> {
    adc: A,
    charge: C,
    config: AdcBatteryConfig,
}

impl<A: AdcInput, C: InputPin> AdcBattery<A, C> {
    pub fn new(adc: A, charge: C, config: AdcBatteryConfig) -> Self {
        Self {
            adc,
            charge,
            config: AdcBatteryConfig {
                divider_den: config.divider_den.max(1),
                samples: config.samples.max(1),
                ..config
            },
        }
    }

    /// Averaged cell voltage in millivolts
    pub fn read_cell_mv(&mut self) -> Result<u32, AdcError> {
        let mut sum = 0u32;
        for _ in 0..self.config.samples {
            sum += self.adc.read_mv()?;
        }
        let pin_mv = sum / self.config.samples as u32;
        Ok(pin_mv * self.config.divider_num as u32 / self.config.divider_den as u32)
    }

    /// Estimate state of charge from cell voltage
    ///
    /// Clamped to 0-100 outside the table, linear interpolation inside.
    pub fn mv_to_percent(cell_mv: u32) -> u8 {
        let (top_mv, top_pct) = SOC_TABLE[0];
        if cell_mv >= top_mv {
            return top_pct;
        }
        let (bottom_mv, bottom_pct) = SOC_TABLE[SOC_TABLE.len() - 1];
        if cell_mv <= bottom_mv {
            return bottom_pct;
        }

        for pair in SOC_TABLE.windows(2) {
            let (v_high, p_high) = pair[0];
            let (v_low, p_low) = pair[1];

            if cell_mv <= v_high && cell_mv >= v_low {
                // pct = p_low + (p_high - p_low) * (v - v_low) / (v_high - v_low)
                let span = (p_high - p_low) as u32;
                let offset = cell_mv - v_low;
                return p_low + (span * offset / (v_high - v_low)) as u8;
            }
        }

        bottom_pct
    }
}

impl<A: AdcInput, C: InputPin> Battery for AdcBattery<A, C> {
    fn init(&mut self) -> Result<(), InitError> {
        match self.adc.read_raw() {
            Ok(_) => Ok(()),
            Err(AdcError::NotConfigured) => Err(InitError::NotFound),
            Err(AdcError::Conversion) => Err(InitError::Bus),
        }
    }

    fn level(&mut self) -> BatteryLevel {
        match self.read_cell_mv() {
            Ok(mv) if mv >= MIN_PLAUSIBLE_MV => BatteryLevel::from_percent(Self::mv_to_percent(mv)),
            _ => BatteryLevel::Unknown,
        }
    }

    fn is_charging(&mut self) -> bool {
        self.charge.is_high() != self.config.charge_active_low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horae_hal::gpio::NoPin;
    use proptest::prelude::*;

    /// ADC returning a fixed pin voltage
    struct FixedAdc {
        pin_mv: u32,
        fail: Option<AdcError>,
    }

    impl AdcInput for FixedAdc {
        fn read_raw(&mut self) -> Result<u16, AdcError> {
            match self.fail {
                Some(e) => Err(e),
                None => Ok((self.pin_mv * 4096 / 3300) as u16),
            }
        }

        fn full_scale(&self) -> u16 {
            4096
        }

        fn vref_mv(&self) -> u16 {
            3300
        }

        fn read_mv(&mut self) -> Result<u32, AdcError> {
            self.read_raw().map(|_| self.pin_mv)
        }
    }

    fn gauge(pin_mv: u32) -> AdcBattery<FixedAdc, NoPin> {
        AdcBattery::new(
            FixedAdc { pin_mv, fail: None },
            NoPin::default(),
            AdcBatteryConfig::default(),
        )
    }

    type Gauge = AdcBattery<FixedAdc, NoPin>;

    #[test]
    fn test_table_points() {
        assert_eq!(Gauge::mv_to_percent(4200), 100);
        assert_eq!(Gauge::mv_to_percent(3840), 50);
        assert_eq!(Gauge::mv_to_percent(3300), 0);
    }

    #[test]
    fn test_interpolation() {
        // Halfway between 3840 (50 %) and 3850 (55 %)
        assert_eq!(Gauge::mv_to_percent(3845), 52);
        // Halfway between 3610 (5 %) and 3690 (10 %)
        assert_eq!(Gauge::mv_to_percent(3650), 7);
    }

    #[test]
    fn test_clamped() {
        assert_eq!(Gauge::mv_to_percent(4350), 100);
        assert_eq!(Gauge::mv_to_percent(3000), 0);
    }

    #[test]
    fn test_level_through_divider() {
        // 1920 mV at the pin is 3840 mV at the cell
        assert_eq!(gauge(1920).level(), BatteryLevel::Percent(50));
        assert_eq!(gauge(2150).level(), BatteryLevel::Percent(100));
    }

    #[test]
    fn test_implausible_reading_is_unknown() {
        assert_eq!(gauge(0).level(), BatteryLevel::Unknown);
        assert_eq!(gauge(1000).level(), BatteryLevel::Unknown);
    }

    #[test]
    fn test_adc_failure() {
        let mut gauge = AdcBattery::new(
            FixedAdc {
                pin_mv: 1900,
                fail: Some(AdcError::Conversion),
            },
            NoPin::default(),
            AdcBatteryConfig::default(),
        );
        assert_eq!(gauge.init(), Err(InitError::Bus));
        assert_eq!(gauge.level(), BatteryLevel::Unknown);
    }

    #[test]
    fn test_charge_pin() {
        // NoPin reads low, which is "charging" for an active-low status line
        let mut gauge = gauge(1900);
        assert!(gauge.is_charging());

        let mut gauge = AdcBattery::new(
            FixedAdc {
                pin_mv: 1900,
                fail: None,
            },
            NoPin::default(),
            AdcBatteryConfig {
                charge_active_low: false,
                ..AdcBatteryConfig::default()
            },
        );
        assert!(!gauge.is_charging());
    }

    proptest! {
        #[test]
        fn prop_percent_monotonic(a in 0u32..5000, b in 0u32..5000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(Gauge::mv_to_percent(lo) <= Gauge::mv_to_percent(hi));
        }

        #[test]
        fn prop_percent_in_range(mv in 0u32..10_000) {
            prop_assert!(Gauge::mv_to_percent(mv) <= 100);
        }
    }
}
