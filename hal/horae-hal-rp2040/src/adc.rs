//! ADC channel for RP2040
//!
//! One-shot blocking conversions on a single channel. The RP2040 ADC is
//! 12 bits wide and referenced to the 3.3 V rail on most boards.

use embassy_rp::adc::{Adc, Blocking, Channel};
use horae_hal::AdcError;

/// Full-scale raw reading (12-bit converter)
pub const ADC_FULL_SCALE: u16 = 4096;

/// A converter bound to the channel it samples
pub struct RpAdcChannel<'d> {
    adc: Adc<'d, Blocking>,
    channel: Channel<'d>,
    vref_mv: u16,
}

impl<'d> RpAdcChannel<'d> {
    /// Bind a channel to the converter
    ///
    /// # Arguments
    /// * `adc` - Blocking ADC driver
    /// * `channel` - Channel to sample (usually a pin channel)
    /// * `vref_mv` - ADC reference voltage in millivolts
    pub fn new(adc: Adc<'d, Blocking>, channel: Channel<'d>, vref_mv: u16) -> Self {
        Self {
            adc,
            channel,
            vref_mv,
        }
    }
}

impl horae_hal::AdcInput for RpAdcChannel<'_> {
    fn read_raw(&mut self) -> Result<u16, AdcError> {
        self.adc
            .blocking_read(&mut self.channel)
            .map_err(|_| AdcError::Conversion)
    }

    fn full_scale(&self) -> u16 {
        ADC_FULL_SCALE
    }

    fn vref_mv(&self) -> u16 {
        self.vref_mv
    }
}
