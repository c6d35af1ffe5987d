//! SPI bus abstractions
//!
//! The e-paper panel is write-only, so the trait only covers writes. Chip
//! select is driven by the panel driver through its own [`OutputPin`].
//!
//! [`OutputPin`]: crate::gpio::OutputPin

/// SPI bus master
pub trait SpiBus {
    /// Error type for SPI operations
    type Error;

    /// Write data without reading
    ///
    /// Blocks until the last byte has left the shift register.
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}

/// SPI configuration
///
/// Mode 0 only; both the panel and SD cards use it.
#[derive(Debug, Clone, Copy)]
pub struct SpiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            frequency: 4_000_000, // SSD16xx tolerates up to 20 MHz writes
        }
    }
}
