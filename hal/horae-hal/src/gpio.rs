//! GPIO pin abstractions
//!
//! Digital input and output pins as seen by the drivers. Pin errors are not
//! modelled: on the supported chips GPIO access cannot fail once the pin is
//! configured.

/// Digital output pin
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently driven high
    fn is_set_high(&self) -> bool;
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// Pin that is never connected
///
/// Used for optional control lines (e.g. a touch wake gate on boards that
/// route the touch interrupt nowhere, or a missing charge-status line).
/// Remembers the requested level so callers can still read it back.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPin {
    high: bool,
}

impl OutputPin for NoPin {
    fn set_high(&mut self) {
        self.high = true;
    }

    fn set_low(&mut self) {
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// Reads back whatever was last written, low by default
impl InputPin for NoPin {
    fn is_high(&self) -> bool {
        self.high
    }
}
