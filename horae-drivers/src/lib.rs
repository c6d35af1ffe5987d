//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the device traits defined
//! in horae-core, written against the bus traits in horae-hal:
//!
//! - Real-time clock with wake timer (BM8563)
//! - Touch controller (GT911)
//! - Debounced push button
//! - ADC battery gauge
//! - Latching power switch
//! - Wi-Fi co-processor speaking ESP-AT (association and SNTP)
//! - E-paper display (framebuffer, text rendering, SSD1683 panel)
//! - SD card storage (feature `sdcard`)

#![no_std]
#![deny(unsafe_code)]

pub mod battery;
pub mod clock;
pub mod display;
pub mod input;
pub mod network;
pub mod power;
#[cfg(feature = "sdcard")]
pub mod storage;
pub mod touch;

pub(crate) mod bcd;
#[cfg(test)]
pub(crate) mod mock;
