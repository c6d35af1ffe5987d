//! ADC abstractions
//!
//! A single analog input already bound to its channel, as needed by the
//! battery gauge.

/// Errors from an ADC conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcError {
    /// Conversion did not complete
    Conversion,
    /// Channel is not configured
    NotConfigured,
}

/// Single-channel ADC input
pub trait AdcInput {
    /// Take one raw sample
    fn read_raw(&mut self) -> Result<u16, AdcError>;

    /// Raw value corresponding to the reference voltage
    ///
    /// 4096 for the RP2040's 12-bit converter.
    fn full_scale(&self) -> u16;

    /// Reference voltage in millivolts
    fn vref_mv(&self) -> u16;

    /// Take one sample and convert it to millivolts at the pin
    fn read_mv(&mut self) -> Result<u32, AdcError> {
        let raw = self.read_raw()? as u32;
        Ok(raw * self.vref_mv() as u32 / self.full_scale() as u32)
    }
}
