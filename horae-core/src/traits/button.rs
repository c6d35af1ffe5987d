//! Push button trait

use super::InitError;

/// Trait for a momentary push button
///
/// Implementations own their debounce and edge state. Callers only ever see
/// presses, never levels.
pub trait Button {
    /// Configure the input
    fn init(&mut self) -> Result<(), InitError>;

    /// True once per physical press
    ///
    /// Returns `true` on the first poll after a debounced press edge and
    /// `false` on every later poll until the button is released and pressed
    /// again.
    fn was_pressed(&mut self) -> bool;
}
