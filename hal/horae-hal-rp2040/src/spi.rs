//! SPI master for RP2040

use embassy_rp::spi::{Blocking, Instance, Spi};

/// Error from SPI operations
///
/// The RP2040 SPI block has no failure modes for plain writes, but the
/// trait needs a concrete type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiBusError;

/// Blocking, write-only SPI bus used by the panel driver
pub struct RpSpi<'d, T: Instance> {
    spi: Spi<'d, T, Blocking>,
}

impl<'d, T: Instance> RpSpi<'d, T> {
    /// Wrap a configured blocking SPI peripheral
    pub fn new(spi: Spi<'d, T, Blocking>) -> Self {
        Self { spi }
    }
}

impl<T: Instance> horae_hal::SpiBus for RpSpi<'_, T> {
    type Error = SpiBusError;

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.spi.blocking_write(data).map_err(|_| SpiBusError)
    }
}
