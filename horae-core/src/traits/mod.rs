//! Device capability traits
//!
//! These traits define the interface between the cycle controller and the
//! hardware-specific drivers. Each is implemented once per board and
//! injected into the controller through generic parameters.
//!
//! `init()` failures are fatal to a cycle and come back as [`InitError`].
//! Everything else reports failure through a sentinel (`bool`, `Option`,
//! [`BatteryLevel::Unknown`](crate::time::BatteryLevel::Unknown)) or a small
//! per-device error enum, and the controller decides what to do with it.

pub mod battery;
pub mod button;
pub mod clock;
pub mod display;
pub mod network;
pub mod power;
pub mod storage;
pub mod touch;

pub use battery::Battery;
pub use button::Button;
pub use clock::{Clock, ClockError};
pub use display::{Batch, Display, DisplayError, DisplayExt};
pub use network::Network;
pub use power::{PowerControl, PowerError};
pub use storage::{EntryList, EntryName, Storage};
pub use touch::Touch;

/// Errors from bringing a device up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    /// Nothing answered on the bus
    NotFound,
    /// A device answered but identified itself as something else
    WrongDevice,
    /// Bus transaction failed after the device was found
    Bus,
    /// Device stayed busy past its deadline
    Timeout,
}

/// The devices the cycle controller brings up, in init order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Device {
    Display,
    Clock,
    Battery,
    Power,
    Network,
}
