//! Buffered UART for RP2040
//!
//! Interrupt-driven ring buffers underneath, blocking writes and
//! non-blocking reads on top. The AT-command driver polls
//! [`UartRx::read_available`] against its own deadline.
//!
//! [`UartRx::read_available`]: horae_hal::UartRx::read_available

use embassy_rp::uart::{BufferedUart, Error};
use embedded_io::{Read, ReadReady, Write};

/// Error from UART operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartError {
    /// Receive FIFO overrun, bytes were lost
    Overrun,
    /// Framing, parity or break error
    Line,
    /// Other error
    Other,
}

impl From<Error> for UartError {
    fn from(e: Error) -> Self {
        match e {
            Error::Overrun => UartError::Overrun,
            Error::Break | Error::Parity | Error::Framing => UartError::Line,
            _ => UartError::Other,
        }
    }
}

/// UART link to the Wi-Fi co-processor
pub struct RpUart {
    uart: BufferedUart,
}

impl RpUart {
    /// Wrap a buffered UART that already has its interrupt bound
    pub fn new(uart: BufferedUart) -> Self {
        Self { uart }
    }
}

impl horae_hal::UartTx for RpUart {
    type Error = UartError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.uart.write_all(data).map_err(UartError::from)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Write::flush(&mut self.uart).map_err(UartError::from)
    }
}

impl horae_hal::UartRx for RpUart {
    type Error = UartError;

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() || !self.uart.read_ready().map_err(UartError::from)? {
            return Ok(0);
        }
        self.uart.read(buf).map_err(UartError::from)
    }
}
