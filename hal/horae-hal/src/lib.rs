//! Horae Hardware Abstraction Layer
//!
//! Bus-level traits that chip-specific HALs implement and that the device
//! drivers in `horae-drivers` are written against. Keeping the drivers on
//! these traits lets them run unchanged on the RP2040 board and against
//! mock buses in host tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  horae-core (cycle controller, traits)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  horae-drivers (RTC, touch, panel, ...) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  horae-hal (this crate - bus traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │  horae-hal-   │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication
//! - [`i2c::I2cBus`] - I2C bus operations, shareable via [`i2c::SharedI2c`]
//! - [`spi::SpiBus`] - SPI write operations
//! - [`adc::AdcInput`] - Single-channel analog sampling

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod gpio;
pub mod i2c;
pub mod spi;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use adc::{AdcError, AdcInput};
pub use gpio::{InputPin, OutputPin};
pub use i2c::{I2cBus, SharedI2c};
pub use spi::SpiBus;
pub use uart::{Uart, UartRx, UartTx};
