//! The wake/render/sleep cycle
//!
//! One cycle per power-on: [`CycleController::begin`] brings the devices up,
//! [`CycleController::render_cycle`] draws the time, and
//! [`CycleController::suspend`] arms the next wake and cuts power.

pub mod controller;
pub mod state;

pub use controller::{
    CycleController, CycleError, Devices, RenderReport, RenderScope, RenderState, ResyncOutcome,
    CLOCK_ERROR_TEXT, POWER_OFF_FAIL_TEXT, WAKE_TIMER_FAIL_TEXT,
};
pub use state::{Phase, PhaseEvent};
