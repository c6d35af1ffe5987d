//! GPIO wrappers for RP2040

use embassy_rp::gpio::{Input, Output};

/// Output pin backed by an `embassy-rp` [`Output`]
pub struct RpOutput<'d> {
    pin: Output<'d>,
}

impl<'d> RpOutput<'d> {
    /// Wrap a configured output pin
    pub fn new(pin: Output<'d>) -> Self {
        Self { pin }
    }
}

impl horae_hal::OutputPin for RpOutput<'_> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}

/// Input pin backed by an `embassy-rp` [`Input`]
pub struct RpInput<'d> {
    pin: Input<'d>,
}

impl<'d> RpInput<'d> {
    /// Wrap a configured input pin
    pub fn new(pin: Input<'d>) -> Self {
        Self { pin }
    }
}

impl horae_hal::InputPin for RpInput<'_> {
    fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}
