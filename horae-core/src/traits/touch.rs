//! Touch panel trait

use super::InitError;
use crate::time::TouchPoint;

/// Trait for a capacitive touch controller
pub trait Touch {
    /// Bring the controller up
    fn init(&mut self) -> Result<(), InitError>;

    /// Poll whether a finger is on the panel right now
    fn is_touched(&mut self) -> bool;

    /// Position of the touch seen by the last [`Touch::is_touched`] poll
    ///
    /// Meaningless unless that poll returned `true`.
    fn current_point(&mut self) -> TouchPoint;
}
