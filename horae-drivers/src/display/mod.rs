//! E-paper display implementations
//!
//! Drawing happens in a 1-bit framebuffer through `embedded-graphics`; only
//! the window touched since the last commit is sent to the panel.
//!
//! ```text
//! EpaperDisplay (Display trait: text, fills, batches)
//!       │
//!       ▼
//! Framebuffer (rotation, dirty window)
//!       │ commit
//!       ▼
//! Panel (controller command set: Ssd1683)
//! ```

pub mod epaper;
pub mod framebuffer;
pub mod ssd1683;

pub use epaper::EpaperDisplay;
pub use framebuffer::{Framebuffer, FramebufferError, Window};
pub use ssd1683::Ssd1683;

use horae_core::layout::RefreshMode;
use horae_core::traits::DisplayError;

/// An e-paper controller that can show a framebuffer window
///
/// The frame is in native orientation, one bit per pixel, rows packed MSB
/// first, a set bit is white.
pub trait Panel {
    /// Native width in pixels, a multiple of 8
    const WIDTH: u32;
    /// Native height in pixels
    const HEIGHT: u32;

    /// Bring the controller up
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Write `window` of `frame` to the controller and refresh it
    ///
    /// Pixels outside `window` are left as the panel currently shows them.
    fn update(
        &mut self,
        frame: &[u8],
        window: Window,
        mode: RefreshMode,
    ) -> Result<(), DisplayError>;
}
