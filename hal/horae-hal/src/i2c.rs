//! I2C bus abstractions
//!
//! Provides the I2C master trait used by the RTC and touch drivers, plus a
//! small sharing wrapper so several drivers can own a handle to the same
//! physical bus.

use core::cell::RefCell;

/// I2C bus master
///
/// Provides basic I2C read/write operations for communicating with
/// peripheral devices.
pub trait I2cBus {
    /// Error type for I2C operations
    type Error;

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Write then read in a single transaction (repeated start)
    ///
    /// This is commonly used to write a register address then read data.
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `write_data` - Bytes to write (typically register address)
    /// * `read_buf` - Buffer to read into
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error>;
}

/// Handle to an I2C bus shared between several drivers
///
/// Each transaction borrows the bus for its duration only. This is only
/// sound for single-threaded use, which is all the clock firmware does:
/// two drivers never run a transaction at the same time.
pub struct SharedI2c<'a, B> {
    bus: &'a RefCell<B>,
}

impl<'a, B> SharedI2c<'a, B> {
    /// Create a new handle to the shared bus
    pub fn new(bus: &'a RefCell<B>) -> Self {
        Self { bus }
    }
}

impl<B> Clone for SharedI2c<'_, B> {
    fn clone(&self) -> Self {
        Self { bus: self.bus }
    }
}

impl<B: I2cBus> I2cBus for SharedI2c<'_, B> {
    type Error = B::Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.bus.borrow_mut().write(address, data)
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.bus.borrow_mut().write_read(address, write_data, read_buf)
    }
}

/// I2C configuration
#[derive(Debug, Clone, Copy)]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self {
            frequency: 100_000, // 100kHz standard mode
        }
    }
}

impl I2cConfig {
    /// Fast mode (400 kHz)
    pub const FAST: Self = Self { frequency: 400_000 };
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts transactions per device address
    struct CountingBus {
        writes: [u8; 2],
    }

    impl I2cBus for CountingBus {
        type Error = ();

        fn write(&mut self, address: u8, _data: &[u8]) -> Result<(), ()> {
            match address {
                0x51 => self.writes[0] += 1,
                0x5D => self.writes[1] += 1,
                _ => return Err(()),
            }
            Ok(())
        }

        fn write_read(&mut self, address: u8, _w: &[u8], read: &mut [u8]) -> Result<(), ()> {
            read.fill(address);
            Ok(())
        }
    }

    #[test]
    fn test_shared_handles_reach_same_bus() {
        let bus = RefCell::new(CountingBus { writes: [0; 2] });
        let mut rtc = SharedI2c::new(&bus);
        let mut touch = rtc.clone();

        rtc.write(0x51, &[0x00]).unwrap();
        touch.write(0x5D, &[0x81, 0x4E, 0x00]).unwrap();
        touch.write(0x5D, &[0x81, 0x4E, 0x00]).unwrap();

        assert_eq!(bus.borrow().writes, [1, 2]);
    }

    #[test]
    fn test_shared_errors_pass_through() {
        let bus = RefCell::new(CountingBus { writes: [0; 2] });
        let mut handle = SharedI2c::new(&bus);

        assert!(handle.write(0x10, &[0]).is_err());

        let mut buf = [0u8; 3];
        handle.write_read(0x51, &[0x02], &mut buf).unwrap();
        assert_eq!(buf, [0x51; 3]);
    }
}
