//! Goodix GT911 capacitive touch controller (I2C)
//!
//! Registers are addressed with 16-bit big-endian addresses. The controller
//! latches a report in its point buffer and raises the ready bit in the
//! status register; the host must clear the status register after reading
//! or no further reports are produced.

use horae_core::traits::{InitError, Touch};
use horae_core::TouchPoint;
use horae_hal::I2cBus;

/// Address with INT held low during reset
pub const ADDRESS: u8 = 0x5D;
/// Address with INT held high during reset
pub const ADDRESS_ALT: u8 = 0x14;

/// GT911 register addresses
pub mod reg {
    /// Product ID, 4 ASCII bytes ("911\0")
    pub const PRODUCT_ID: u16 = 0x8140;
    /// Buffer status and touch count
    pub const STATUS: u16 = 0x814E;
    /// First touch point (x lo, x hi, y lo, y hi)
    pub const POINT1: u16 = 0x8150;
}

/// STATUS: a new report is in the point buffer
const STATUS_READY: u8 = 1 << 7;
/// STATUS: number of touch points
const STATUS_COUNT_MASK: u8 = 0x0F;

const PRODUCT_ID: &[u8; 3] = b"911";

/// GT911 driver
pub struct Gt911<I> {
    i2c: I,
    address: u8,
    last: TouchPoint,
}

impl<I: I2cBus> Gt911<I> {
    pub fn new(i2c: I) -> Self {
        Self::with_address(i2c, ADDRESS)
    }

    pub fn with_address(i2c: I, address: u8) -> Self {
        Self {
            i2c,
            address,
            last: TouchPoint::default(),
        }
    }

    fn read(&mut self, register: u16, buf: &mut [u8]) -> Result<(), ()> {
        self.i2c
            .write_read(self.address, &register.to_be_bytes(), buf)
            .map_err(|_| ())
    }

    fn clear_status(&mut self) -> Result<(), ()> {
        let [hi, lo] = reg::STATUS.to_be_bytes();
        self.i2c.write(self.address, &[hi, lo, 0]).map_err(|_| ())
    }

    /// Read a pending report, returning the first point if there is one
    fn poll(&mut self) -> Result<Option<TouchPoint>, ()> {
        let mut status = [0u8; 1];
        self.read(reg::STATUS, &mut status)?;
        if status[0] & STATUS_READY == 0 {
            return Ok(None);
        }

        let point = if status[0] & STATUS_COUNT_MASK > 0 {
            let mut raw = [0u8; 4];
            self.read(reg::POINT1, &mut raw)?;
            Some(TouchPoint {
                x: u16::from_le_bytes([raw[0], raw[1]]) as i32,
                y: u16::from_le_bytes([raw[2], raw[3]]) as i32,
            })
        } else {
            None
        };

        self.clear_status()?;
        Ok(point)
    }
}

impl<I: I2cBus> Touch for Gt911<I> {
    fn init(&mut self) -> Result<(), InitError> {
        let mut id = [0u8; 4];
        self.read(reg::PRODUCT_ID, &mut id)
            .map_err(|_| InitError::NotFound)?;
        if &id[..3] != PRODUCT_ID {
            return Err(InitError::WrongDevice);
        }
        self.clear_status().map_err(|_| InitError::Bus)
    }

    fn is_touched(&mut self) -> bool {
        match self.poll() {
            Ok(Some(point)) => {
                self.last = point;
                true
            }
            _ => false,
        }
    }

    /// Point of the most recent touch seen by [`Touch::is_touched`]
    fn current_point(&mut self) -> TouchPoint {
        if let Ok(Some(point)) = self.poll() {
            self.last = point;
        }
        self.last
    }
}
