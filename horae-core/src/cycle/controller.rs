//! Cycle controller
//!
//! Owns the devices for one wake and sequences them through
//! `begin` → `render_cycle` → `suspend`. All policy decisions are delegated
//! to [`crate::policy`]; this module only does the sequencing and decides
//! what ends up on the panel when something fails.

use super::state::{Phase, PhaseEvent};
use crate::config::ClockConfig;
use crate::layout::{Font, Point, RefreshMode};
use crate::policy::{self, RedrawScope};
use crate::time::{BatteryLevel, Timestamp};
use crate::traits::{
    Battery, Clock, Device, Display, DisplayExt, InitError, Network, PowerControl, PowerError,
};

/// Shown instead of the time when the clock cannot be read
pub const CLOCK_ERROR_TEXT: &str = "RTC error";

/// Shown when the board is still running after power-off
pub const POWER_OFF_FAIL_TEXT: &str = "power off fail!!!";

/// Shown when the wake timer could not be armed
pub const WAKE_TIMER_FAIL_TEXT: &str = "wake timer fail";

/// Vertical distance between diagnostic lines
const DIAGNOSTIC_LINE_SPACING: i32 = 24;

/// Errors that end a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleError {
    /// A device failed to initialize; later devices were not touched
    Init { device: Device, error: InitError },
    /// A phase was called from the wrong phase
    OutOfOrder { expected: Phase, actual: Phase },
    /// The board is still running after power-off
    PowerOffFailed {
        sleep_seconds: u32,
        reason: PowerError,
    },
}

/// The devices a controller owns for one cycle
pub struct Devices<D, C, B, P, N> {
    pub display: D,
    pub clock: C,
    pub battery: B,
    pub power: P,
    pub network: N,
}

/// What the controller remembers about the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RenderState {
    /// Battery level currently shown, `None` if nothing is
    pub battery: Option<BatteryLevel>,
    /// Whether the current cycle cleared the whole panel
    pub full_clear: bool,
}

/// Outcome of the network resync step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResyncOutcome {
    /// Not the configured resync time
    NotDue,
    /// Could not associate with the access point
    ConnectFailed,
    /// Associated, but no plausible time arrived
    SyncFailed,
    /// Clock updated from the network
    Synced,
}

/// How much of the panel a render touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderScope {
    /// Whole panel cleared and redrawn
    Full,
    /// Clock region erased and redrawn
    Partial,
    /// Only the clock error message was drawn
    ErrorOnly,
}

impl From<RedrawScope> for RenderScope {
    fn from(scope: RedrawScope) -> Self {
        match scope {
            RedrawScope::Full => RenderScope::Full,
            RedrawScope::Partial => RenderScope::Partial,
        }
    }
}

/// What one `render_cycle` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RenderReport {
    /// Time that was rendered, `None` on a clock error
    pub time: Option<Timestamp>,
    pub scope: RenderScope,
    pub resync: ResyncOutcome,
    pub battery_redrawn: bool,
    /// False if the panel refresh failed
    pub committed: bool,
}

/// Runs one wake/render/sleep cycle
pub struct CycleController<D, C, B, P, N> {
    devices: Devices<D, C, B, P, N>,
    config: ClockConfig,
    phase: Phase,
    state: RenderState,
    clock_available: bool,
    force_full: bool,
}

impl<D, C, B, P, N> CycleController<D, C, B, P, N>
where
    D: Display,
    C: Clock,
    B: Battery,
    P: PowerControl,
    N: Network,
{
    /// Create a controller for a freshly powered board
    pub fn new(devices: Devices<D, C, B, P, N>, config: ClockConfig) -> Self {
        Self {
            devices,
            config,
            phase: Phase::Uninitialized,
            state: RenderState::default(),
            clock_available: false,
            force_full: false,
        }
    }

    /// Start from what a previous cycle left on the panel
    ///
    /// Only useful on boards that keep RAM alive across sleeps.
    pub fn with_render_state(mut self, state: RenderState) -> Self {
        self.state = RenderState {
            full_clear: false,
            ..state
        };
        self
    }

    /// Make the next render clear the whole panel regardless of the minute
    pub fn request_full_refresh(&mut self) {
        self.force_full = true;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn render_state(&self) -> RenderState {
        self.state
    }

    /// False if the clock was missing at `begin`
    pub fn clock_available(&self) -> bool {
        self.clock_available
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    pub fn devices(&self) -> &Devices<D, C, B, P, N> {
        &self.devices
    }

    /// Give the devices back, e.g. to power down after a failed `begin`
    pub fn into_devices(self) -> Devices<D, C, B, P, N> {
        self.devices
    }

    fn check(&self, event: PhaseEvent) -> Result<(), CycleError> {
        if self.phase.accepts(event) {
            Ok(())
        } else {
            Err(CycleError::OutOfOrder {
                expected: event.required_phase(),
                actual: self.phase,
            })
        }
    }

    /// Initialize every device
    ///
    /// Order is display, clock, battery, power, network. The first failure
    /// is returned and later devices are left alone. A clock that comes up
    /// unavailable is not a failure; it is remembered and the cycle shows an
    /// error instead of the time.
    pub fn begin(&mut self) -> Result<(), CycleError> {
        self.check(PhaseEvent::Begin)?;

        let d = &mut self.devices;
        d.display.init().map_err(init_error(Device::Display))?;
        d.display.set_rotation(self.config.display.rotation);
        d.clock.init().map_err(init_error(Device::Clock))?;
        self.clock_available = d.clock.is_available();
        d.battery.init().map_err(init_error(Device::Battery))?;
        d.power.init().map_err(init_error(Device::Power))?;
        d.network.init().map_err(init_error(Device::Network))?;

        self.phase = self.phase.transition(PhaseEvent::Begin);
        Ok(())
    }

    /// Draw the time and battery level and push them to the panel
    pub fn render_cycle(&mut self) -> Result<RenderReport, CycleError> {
        self.check(PhaseEvent::Render)?;
        let report = self.render();
        self.phase = self.phase.transition(PhaseEvent::Render);
        Ok(report)
    }

    /// Arm the next wake and cut power
    ///
    /// Only returns if the board is still running afterwards. By then the
    /// failure is already on the panel; the returned error says why.
    pub fn suspend(&mut self) -> CycleError {
        if let Err(e) = self.check(PhaseEvent::Suspend) {
            return e;
        }
        self.phase = self.phase.transition(PhaseEvent::Suspend);

        // Re-read: a resync or a slow refresh may have moved the clock
        let second = self.read_clock().map(|now| now.second);
        let sleep_seconds = policy::sleep_seconds(second, self.config.power.fallback_sleep_s);

        let power = &mut self.devices.power;
        if self.config.power.wake_on_button {
            power.enable_wake_on_button();
        }
        if self.config.power.wake_on_touch {
            power.enable_wake_on_touch();
        }
        if power.sleep_for(sleep_seconds).is_err() {
            self.draw_diagnostic(WAKE_TIMER_FAIL_TEXT, 1);
        }

        let reason = self.devices.power.power_off();
        self.draw_diagnostic(POWER_OFF_FAIL_TEXT, 0);
        CycleError::PowerOffFailed {
            sleep_seconds,
            reason,
        }
    }

    fn render(&mut self) -> RenderReport {
        self.state.full_clear = false;

        let now = match self.read_clock() {
            Some(now) => now,
            None => return self.render_clock_error(),
        };

        let resync = if policy::resync_due(&now, self.config.resync.hour, self.config.resync.minute)
        {
            self.resync()
        } else {
            ResyncOutcome::NotDue
        };

        let scope = if self.force_full {
            RedrawScope::Full
        } else {
            policy::redraw_scope(now.minute, self.config.display.full_refresh_every_min)
        };
        self.force_full = false;

        let layout = self.config.layout;
        let display = &mut self.devices.display;
        match scope {
            RedrawScope::Full => {
                display.clear(true);
                self.state.full_clear = true;
                // The clear took the battery indicator with it
                self.state.battery = None;
            }
            RedrawScope::Partial => {
                let mut batch = display.batch();
                batch.fill_region(layout.clock_region, true);
            }
        }

        {
            let mut batch = display.batch();
            batch.select_font(Font::Large);
            batch.draw_text(&policy::format_clock(&now), layout.clock_anchor());
        }

        let level = self.devices.battery.level();
        let battery_redrawn = policy::battery_needs_redraw(self.state.battery, level);
        if battery_redrawn {
            let mut batch = self.devices.display.batch();
            batch.select_font(Font::Small);
            batch.draw_text(&policy::format_battery(level), layout.battery_anchor);
            self.state.battery = Some(level);
        }

        let committed = self.commit();
        RenderReport {
            time: Some(now),
            scope: scope.into(),
            resync,
            battery_redrawn,
            committed,
        }
    }

    fn render_clock_error(&mut self) -> RenderReport {
        let at = self.config.layout.error_anchor;
        {
            let mut batch = self.devices.display.batch();
            batch.select_font(Font::Small);
            batch.draw_text(CLOCK_ERROR_TEXT, at);
        }
        let committed = self.commit();
        RenderReport {
            time: None,
            scope: RenderScope::ErrorOnly,
            resync: ResyncOutcome::NotDue,
            battery_redrawn: false,
            committed,
        }
    }

    fn resync(&mut self) -> ResyncOutcome {
        let net = &self.config.network;
        let devices = &mut self.devices;
        if !devices.network.connect(&net.ssid, &net.password) {
            return ResyncOutcome::ConnectFailed;
        }
        if devices.network.sync_time(&net.ntp_server, &mut devices.clock) {
            ResyncOutcome::Synced
        } else {
            ResyncOutcome::SyncFailed
        }
    }

    /// Current time, or `None` if the clock is missing or returned garbage
    fn read_clock(&mut self) -> Option<Timestamp> {
        if !self.clock_available {
            return None;
        }
        self.devices.clock.now().ok().filter(Timestamp::is_valid)
    }

    fn draw_diagnostic(&mut self, text: &str, line: i32) {
        let base = self.config.layout.diagnostic_anchor;
        let at = Point::new(base.x, base.y + line * DIAGNOSTIC_LINE_SPACING);
        {
            let mut batch = self.devices.display.batch();
            batch.select_font(Font::Small);
            batch.draw_text(text, at);
        }
        self.commit();
    }

    fn commit(&mut self) -> bool {
        self.devices.display.commit(RefreshMode::Slow).is_ok()
    }
}

fn init_error(device: Device) -> impl Fn(InitError) -> CycleError {
    move |error| CycleError::Init { device, error }
}
