//! RP2040-specific HAL for the e-paper clock
//!
//! This crate provides RP2040 implementations of the shared `horae-hal`
//! traits on top of the blocking `embassy-rp` peripheral drivers:
//!
//! - GPIO input/output wrappers
//! - I2C master (RTC and touch controller share one bus)
//! - SPI master (e-paper panel)
//! - Buffered UART (Wi-Fi co-processor link)
//! - ADC channel (battery voltage divider)
//!
//! Everything here is blocking. The clock runs one short cycle per wake and
//! never has two devices in flight at once.

#![no_std]

pub mod adc;
pub mod gpio;
pub mod i2c;
pub mod spi;
pub mod uart;

// Re-export shared traits from horae-hal for convenience
pub use horae_hal::{AdcInput, I2cBus, InputPin, OutputPin, SpiBus, UartRx, UartTx};
