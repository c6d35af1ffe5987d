//! Display trait for the e-paper panel

use core::ops::{Deref, DerefMut};

use super::InitError;
use crate::layout::{Font, Point, Region, RefreshMode, Rotation};

/// Errors that can occur while pushing a frame to the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Bus write failed
    Bus,
    /// Panel did not finish its refresh in time
    Timeout,
}

/// Trait for a buffered drawing surface backed by a physical panel
///
/// Drawing calls only touch the buffer. Nothing is visible until
/// [`Display::commit`].
pub trait Display {
    /// Bring the panel up
    fn init(&mut self) -> Result<(), InitError>;

    /// Set the orientation used by subsequent drawing
    fn set_rotation(&mut self, rotation: Rotation);

    /// Fill the whole buffer with white (`true`) or black (`false`)
    fn clear(&mut self, white: bool);

    /// Draw text with its top-left corner at `at`
    fn draw_text(&mut self, text: &str, at: Point);

    /// Fill a rectangle with white (`true`) or black (`false`)
    fn fill_region(&mut self, region: Region, white: bool);

    /// Integer scale applied to the selected font
    fn set_text_scale(&mut self, scale: u8);

    /// Select the font for subsequent text
    fn select_font(&mut self, font: Font);

    /// Push buffered drawing to the panel
    ///
    /// `Slow` trades latency for less visible ghosting.
    fn commit(&mut self, mode: RefreshMode) -> Result<(), DisplayError>;

    /// Open a batch of drawing calls that belong to one partial refresh
    ///
    /// Prefer [`DisplayExt::batch`], which guarantees the matching
    /// [`Display::end_batch`].
    fn begin_batch(&mut self);

    /// Close the batch opened by [`Display::begin_batch`]
    fn end_batch(&mut self);
}

/// Scoped batch helpers for every [`Display`]
pub trait DisplayExt: Display {
    /// Open a batch that closes when the guard is dropped
    ///
    /// The guard dereferences to the display, so drawing goes through it:
    ///
    /// ```ignore
    /// let mut batch = display.batch();
    /// batch.fill_region(region, true);
    /// ```
    fn batch(&mut self) -> Batch<'_, Self> {
        self.begin_batch();
        Batch { display: self }
    }
}

impl<D: Display + ?Sized> DisplayExt for D {}

/// An open batch; calls `end_batch` on drop
pub struct Batch<'a, D: Display + ?Sized> {
    display: &'a mut D,
}

impl<D: Display + ?Sized> Deref for Batch<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        self.display
    }
}

impl<D: Display + ?Sized> DerefMut for Batch<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        self.display
    }
}

impl<D: Display + ?Sized> Drop for Batch<'_, D> {
    fn drop(&mut self) {
        self.display.end_batch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counting {
        open: i32,
        max_open: i32,
        fills: u32,
    }

    impl Display for Counting {
        fn init(&mut self) -> Result<(), InitError> {
            Ok(())
        }
        fn set_rotation(&mut self, _rotation: Rotation) {}
        fn clear(&mut self, _white: bool) {}
        fn draw_text(&mut self, _text: &str, _at: Point) {}
        fn fill_region(&mut self, _region: Region, _white: bool) {
            self.fills += 1;
        }
        fn set_text_scale(&mut self, _scale: u8) {}
        fn select_font(&mut self, _font: Font) {}
        fn commit(&mut self, _mode: RefreshMode) -> Result<(), DisplayError> {
            Ok(())
        }
        fn begin_batch(&mut self) {
            self.open += 1;
            self.max_open = self.max_open.max(self.open);
        }
        fn end_batch(&mut self) {
            self.open -= 1;
        }
    }

    fn draw_or_bail(display: &mut Counting, bail: bool) -> Result<(), ()> {
        let mut batch = display.batch();
        if bail {
            return Err(());
        }
        batch.fill_region(Region::new(0, 0, 1, 1), true);
        Ok(())
    }

    #[test]
    fn test_batch_closes_on_drop() {
        let mut display = Counting::default();
        {
            let mut batch = display.batch();
            batch.fill_region(Region::new(0, 0, 10, 10), true);
        }
        assert_eq!(display.open, 0);
        assert_eq!(display.max_open, 1);
        assert_eq!(display.fills, 1);
    }

    #[test]
    fn test_batch_closes_on_early_return() {
        let mut display = Counting::default();
        assert!(draw_or_bail(&mut display, true).is_err());
        assert_eq!(display.open, 0);
        assert!(draw_or_bail(&mut display, false).is_ok());
        assert_eq!(display.open, 0);
        assert_eq!(display.fills, 1);
    }
}
