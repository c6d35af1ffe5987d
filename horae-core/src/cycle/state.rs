//! Cycle phase state machine
//!
//! Strictly linear: every phase has exactly one event that leaves it and no
//! way back.

/// Cycle phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Devices constructed, nothing initialized
    Uninitialized,
    /// Every device initialized
    Initialized,
    /// Frame drawn and committed
    Rendered,
    /// Wake armed and power-off attempted (terminal)
    Suspended,
}

/// Events that advance the cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhaseEvent {
    /// `begin()` succeeded
    Begin,
    /// `render_cycle()` ran
    Render,
    /// `suspend()` ran
    Suspend,
}

impl PhaseEvent {
    /// The phase this event must be raised from
    pub fn required_phase(self) -> Phase {
        match self {
            PhaseEvent::Begin => Phase::Uninitialized,
            PhaseEvent::Render => Phase::Initialized,
            PhaseEvent::Suspend => Phase::Rendered,
        }
    }
}

impl Phase {
    /// Check if `event` is legal from this phase
    pub fn accepts(self, event: PhaseEvent) -> bool {
        self == event.required_phase()
    }

    /// Check if this is the terminal phase
    pub fn is_terminal(self) -> bool {
        self == Phase::Suspended
    }

    /// Process an event and return the next phase
    ///
    /// Illegal events leave the phase unchanged; callers check
    /// [`Phase::accepts`] first to report them.
    pub fn transition(self, event: PhaseEvent) -> Self {
        use Phase::*;
        use PhaseEvent::*;

        match (self, event) {
            (Uninitialized, Begin) => Initialized,
            (Initialized, Render) => Rendered,
            (Rendered, Suspend) => Suspended,
            (state, _) => state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_path() {
        let phase = Phase::Uninitialized
            .transition(PhaseEvent::Begin)
            .transition(PhaseEvent::Render)
            .transition(PhaseEvent::Suspend);
        assert_eq!(phase, Phase::Suspended);
        assert!(phase.is_terminal());
    }

    #[test]
    fn test_out_of_order_events_ignored() {
        assert_eq!(
            Phase::Uninitialized.transition(PhaseEvent::Render),
            Phase::Uninitialized
        );
        assert_eq!(
            Phase::Initialized.transition(PhaseEvent::Suspend),
            Phase::Initialized
        );
        assert_eq!(
            Phase::Rendered.transition(PhaseEvent::Begin),
            Phase::Rendered
        );
    }

    #[test]
    fn test_terminal_accepts_nothing() {
        for event in [PhaseEvent::Begin, PhaseEvent::Render, PhaseEvent::Suspend] {
            assert!(!Phase::Suspended.accepts(event));
            assert_eq!(Phase::Suspended.transition(event), Phase::Suspended);
        }
    }

    #[test]
    fn test_accepts_matches_required_phase() {
        assert!(Phase::Uninitialized.accepts(PhaseEvent::Begin));
        assert!(Phase::Initialized.accepts(PhaseEvent::Render));
        assert!(Phase::Rendered.accepts(PhaseEvent::Suspend));
        assert!(!Phase::Initialized.accepts(PhaseEvent::Begin));
    }
}
