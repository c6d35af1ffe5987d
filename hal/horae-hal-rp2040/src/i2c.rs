//! I2C master for RP2040
//!
//! Wraps a blocking `embassy-rp` I2C peripheral. The RTC and the touch
//! controller sit on the same bus, so the firmware usually puts one of these
//! in a `RefCell` and hands out [`horae_hal::SharedI2c`] handles.

use embassy_rp::i2c::{Blocking, Error, I2c, Instance};

/// Error from I2C operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cBusError {
    /// Device did not acknowledge its address or a data byte
    Nack,
    /// Arbitration lost or bus fault
    Bus,
    /// Transfer length not supported by the peripheral
    InvalidLength,
    /// Other error
    Other,
}

impl From<Error> for I2cBusError {
    fn from(e: Error) -> Self {
        match e {
            Error::Abort(embassy_rp::i2c::AbortReason::NoAcknowledge) => I2cBusError::Nack,
            Error::Abort(_) => I2cBusError::Bus,
            Error::InvalidReadBufferLength | Error::InvalidWriteBufferLength => {
                I2cBusError::InvalidLength
            }
            _ => I2cBusError::Other,
        }
    }
}

/// Blocking I2C bus on an RP2040 I2C block
pub struct RpI2c<'d, T: Instance> {
    i2c: I2c<'d, T, Blocking>,
}

impl<'d, T: Instance> RpI2c<'d, T> {
    /// Wrap a configured blocking I2C peripheral
    pub fn new(i2c: I2c<'d, T, Blocking>) -> Self {
        Self { i2c }
    }
}

impl<T: Instance> horae_hal::I2cBus for RpI2c<'_, T> {
    type Error = I2cBusError;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.i2c
            .blocking_write(address, data)
            .map_err(I2cBusError::from)
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.i2c
            .blocking_write_read(address, write_data, read_buf)
            .map_err(I2cBusError::from)
    }
}
