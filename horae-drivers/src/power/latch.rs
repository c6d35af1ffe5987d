//! Latching power switch
//!
//! The board's regulator enable is an OR of three sources: the MCU hold
//! line, the RTC wake interrupt and the power button. The firmware keeps
//! itself alive by driving the hold line high; releasing it cuts power
//! unless another source (or USB) still holds the regulator on.
//!
//! Touch and button wake are routed to the enable line through gate
//! transistors so they can be disabled while the board sleeps. Boards that
//! hardwire a source pass [`horae_hal::gpio::NoPin`] for its gate.

use embedded_hal::delay::DelayNs;
use horae_core::traits::{InitError, PowerControl, PowerError};
use horae_hal::OutputPin;

use super::WakeTimer;

/// Latch configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LatchPowerConfig {
    /// How long to wait for the rails to collapse after releasing the hold
    pub off_settle_ms: u32,
}

impl Default for LatchPowerConfig {
    fn default() -> Self {
        Self { off_settle_ms: 500 }
    }
}

/// Power control through a latching regulator enable
pub struct LatchPower<H, T, B, G, D> {
    hold: H,
    timer: T,
    button_gate: B,
    touch_gate: G,
    delay: D,
    config: LatchPowerConfig,
}

impl<H, T, B, G, D> LatchPower<H, T, B, G, D>
where
    H: OutputPin,
    T: WakeTimer,
    B: OutputPin,
    G: OutputPin,
    D: DelayNs,
{
    /// Create the latch driver
    ///
    /// # Arguments
    /// - `hold`: MCU hold line, high keeps the board powered
    /// - `timer`: wake timer wired to the enable line
    /// - `button_gate`: high lets the power button wake the board
    /// - `touch_gate`: high lets the touch interrupt wake the board
    pub fn new(
        hold: H,
        timer: T,
        button_gate: B,
        touch_gate: G,
        delay: D,
        config: LatchPowerConfig,
    ) -> Self {
        Self {
            hold,
            timer,
            button_gate,
            touch_gate,
            delay,
            config,
        }
    }

    /// True while the hold line keeps the board powered
    pub fn is_holding(&self) -> bool {
        self.hold.is_set_high()
    }

    pub fn timer(&mut self) -> &mut T {
        &mut self.timer
    }
}

impl<H, T, B, G, D> PowerControl for LatchPower<H, T, B, G, D>
where
    H: OutputPin,
    T: WakeTimer,
    B: OutputPin,
    G: OutputPin,
    D: DelayNs,
{
    fn init(&mut self) -> Result<(), InitError> {
        self.hold.set_high();
        // Wake sources start disabled; the cycle opts in before sleeping
        self.button_gate.set_low();
        self.touch_gate.set_low();
        Ok(())
    }

    fn sleep_for(&mut self, seconds: u32) -> Result<(), PowerError> {
        self.timer.arm(seconds)
    }

    /// Release the hold line
    ///
    /// Returning at all means something else is still powering the board.
    fn power_off(&mut self) -> PowerError {
        self.hold.set_low();
        self.delay.delay_ms(self.config.off_settle_ms);
        // Still here: take the latch back so the caller can report it
        self.hold.set_high();
        PowerError::StillPowered
    }

    fn enable_wake_on_touch(&mut self) {
        self.touch_gate.set_high();
    }

    fn enable_wake_on_button(&mut self) {
        self.button_gate.set_high();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horae_hal::gpio::NoPin;

    #[derive(Default)]
    struct FakeTimer {
        armed: Option<u32>,
    }

    impl WakeTimer for FakeTimer {
        fn arm(&mut self, seconds: u32) -> Result<(), PowerError> {
            if seconds == 0 {
                return Err(PowerError::DurationOutOfRange);
            }
            self.armed = Some(seconds);
            Ok(())
        }

        fn disarm(&mut self) -> Result<(), PowerError> {
            self.armed = None;
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingDelay {
        total_ms: u32,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ms += ns / 1_000_000;
        }

        fn delay_ms(&mut self, ms: u32) {
            self.total_ms += ms;
        }
    }

    type Latch = LatchPower<NoPin, FakeTimer, NoPin, NoPin, CountingDelay>;

    fn latch() -> Latch {
        let mut latch = LatchPower::new(
            NoPin::default(),
            FakeTimer::default(),
            NoPin::default(),
            NoPin::default(),
            CountingDelay::default(),
            LatchPowerConfig::default(),
        );
        latch.init().unwrap();
        latch
    }

    #[test]
    fn test_init_holds_power_with_wake_gates_closed() {
        let latch = latch();
        assert!(latch.is_holding());
        assert!(!latch.button_gate.is_set_high());
        assert!(!latch.touch_gate.is_set_high());
    }

    #[test]
    fn test_sleep_arms_timer() {
        let mut latch = latch();
        latch.sleep_for(45).unwrap();
        assert_eq!(latch.timer().armed, Some(45));
        assert_eq!(latch.sleep_for(0), Err(PowerError::DurationOutOfRange));
    }

    #[test]
    fn test_wake_gates() {
        let mut latch = latch();
        latch.enable_wake_on_button();
        assert!(latch.button_gate.is_set_high());
        assert!(!latch.touch_gate.is_set_high());

        latch.enable_wake_on_touch();
        assert!(latch.touch_gate.is_set_high());
    }

    #[test]
    fn test_power_off_waits_then_reports() {
        let mut latch = latch();
        assert_eq!(latch.power_off(), PowerError::StillPowered);
        assert_eq!(latch.delay.total_ms, 500);
        assert!(latch.is_holding());
    }
}
