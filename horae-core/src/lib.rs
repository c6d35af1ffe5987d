//! Board-agnostic core logic for the e-paper clock
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Device capability traits (display, touch, button, clock, battery,
//!   power control, network, storage)
//! - The wake/render/sleep cycle controller and its phase state machine
//! - Redraw, resync and sleep policy
//! - Time and layout types
//! - Configuration types and the config file parser

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod cycle;
pub mod layout;
pub mod policy;
pub mod time;
pub mod traits;

pub use cycle::{CycleController, CycleError, Devices, Phase, RenderReport};
pub use time::{BatteryLevel, Timestamp, TouchPoint};
