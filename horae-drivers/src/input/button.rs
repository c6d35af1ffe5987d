//! Debounced push button
//!
//! Integrating debouncer: every sample moves a counter one step towards the
//! raw level, and the debounced state only flips when the counter reaches
//! either end. A release-to-press flip latches a press that stays pending
//! until [`Button::was_pressed`] consumes it.

use horae_core::traits::{Button, InitError};
use horae_hal::InputPin;

/// Debounce configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebounceConfig {
    /// Consecutive agreeing samples needed to change state
    pub threshold: u8,
    /// Pin reads low while pressed (button to ground with pull-up)
    pub active_low: bool,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            threshold: 4,
            active_low: true,
        }
    }
}

/// Push button on a GPIO with software debouncing
pub struct DebouncedButton<P> {
    pin: P,
    config: DebounceConfig,
    integrator: u8,
    pressed: bool,
    /// Press edge not yet reported
    pending: bool,
}

impl<P: InputPin> DebouncedButton<P> {
    pub fn new(pin: P, config: DebounceConfig) -> Self {
        Self {
            pin,
            config: DebounceConfig {
                threshold: config.threshold.max(1),
                ..config
            },
            integrator: 0,
            pressed: false,
            pending: false,
        }
    }

    /// Take one sample
    ///
    /// Call at a fixed interval (a few milliseconds) for the debouncer to
    /// make progress.
    pub fn poll(&mut self) {
        let raw = self.pin.is_high() != self.config.active_low;
        if raw {
            self.integrator = (self.integrator + 1).min(self.config.threshold);
        } else {
            self.integrator = self.integrator.saturating_sub(1);
        }

        if !self.pressed && self.integrator == self.config.threshold {
            self.pressed = true;
            self.pending = true;
        } else if self.pressed && self.integrator == 0 {
            self.pressed = false;
        }
    }

    /// Debounced level
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }
}

impl<P: InputPin> Button for DebouncedButton<P> {
    fn init(&mut self) -> Result<(), InitError> {
        self.integrator = 0;
        self.pressed = false;
        self.pending = false;
        Ok(())
    }

    /// Takes one sample, then reports and consumes a pending press
    fn was_pressed(&mut self) -> bool {
        self.poll();
        core::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct ScriptPin<'a> {
        level: &'a Cell<bool>,
    }

    impl InputPin for ScriptPin<'_> {
        fn is_high(&self) -> bool {
            self.level.get()
        }
    }

    fn button(level: &Cell<bool>, threshold: u8) -> DebouncedButton<ScriptPin<'_>> {
        DebouncedButton::new(
            ScriptPin { level },
            DebounceConfig {
                threshold,
                active_low: true,
            },
        )
    }

    #[test]
    fn test_single_press_reported_once() {
        let level = Cell::new(true);
        let mut button = button(&level, 3);

        level.set(false);
        assert!(!button.was_pressed());
        assert!(!button.was_pressed());
        assert!(button.was_pressed());
        // Still held: no second press
        for _ in 0..10 {
            assert!(!button.was_pressed());
        }
        assert!(button.is_pressed());
    }

    #[test]
    fn test_bounce_is_filtered() {
        let level = Cell::new(true);
        let mut button = button(&level, 3);

        // Contact bounce on press
        for raw in [false, true, false, true, false] {
            level.set(raw);
            button.poll();
        }
        assert!(!button.is_pressed());

        level.set(false);
        button.poll();
        button.poll();
        assert!(button.is_pressed());
        assert!(button.was_pressed());
    }

    #[test]
    fn test_release_then_press_again() {
        let level = Cell::new(false);
        let mut button = button(&level, 2);

        button.poll();
        assert!(button.was_pressed());

        level.set(true);
        button.poll();
        button.poll();
        assert!(!button.is_pressed());

        level.set(false);
        button.poll();
        assert!(button.was_pressed());
    }

    #[test]
    fn test_active_high() {
        let level = Cell::new(true);
        let mut button = DebouncedButton::new(
            ScriptPin { level: &level },
            DebounceConfig {
                threshold: 1,
                active_low: false,
            },
        );

        assert!(button.was_pressed());
        level.set(false);
        button.poll();
        assert!(!button.is_pressed());
    }

    #[test]
    fn test_init_drops_pending_press() {
        let level = Cell::new(false);
        let mut button = button(&level, 1);
        button.poll();

        button.init().unwrap();

        level.set(true);
        assert!(!button.was_pressed());
    }
}
