//! Display trait over a framebuffer and an e-paper panel
//!
//! Text uses the `embedded-graphics` 10x20 mono font. The large font is the
//! same glyphs scaled four times, which puts "HH:MM" at 200x80 pixels.
//! Text positions are the top-left corner of the first glyph.

use embedded_graphics::mono_font::ascii::FONT_10X20;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use horae_core::layout::{self, Font, Region, RefreshMode, Rotation};
use horae_core::traits::{Display, DisplayError, InitError};

use super::framebuffer::Framebuffer;
use super::Panel;

/// Glyph magnification of [`Font::Large`]
pub const LARGE_FONT_SCALE: u32 = 4;

/// Largest accepted text scale
pub const MAX_TEXT_SCALE: u8 = 8;

/// E-paper display
pub struct EpaperDisplay<P, B> {
    panel: P,
    fb: Framebuffer<B>,
    font: Font,
    text_scale: u8,
    batch_depth: u8,
}

impl<P, B> EpaperDisplay<P, B>
where
    P: Panel,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Create a display drawing into `fb`
    ///
    /// The framebuffer must have the panel's native size.
    pub fn new(panel: P, fb: Framebuffer<B>) -> Self {
        Self {
            panel,
            fb,
            font: Font::Small,
            text_scale: 1,
            batch_depth: 0,
        }
    }

    pub fn framebuffer(&self) -> &Framebuffer<B> {
        &self.fb
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    /// Number of batches currently open
    pub fn batch_depth(&self) -> u8 {
        self.batch_depth
    }

    fn glyph_scale(&self) -> u32 {
        let base = match self.font {
            Font::Small => 1,
            Font::Large => LARGE_FONT_SCALE,
        };
        base * self.text_scale as u32
    }
}

impl<P, B> Display for EpaperDisplay<P, B>
where
    P: Panel,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    fn init(&mut self) -> Result<(), InitError> {
        self.panel.init().map_err(|e| match e {
            DisplayError::Bus => InitError::Bus,
            DisplayError::Timeout => InitError::Timeout,
        })
    }

    fn set_rotation(&mut self, rotation: Rotation) {
        self.fb.set_rotation(rotation);
    }

    fn clear(&mut self, white: bool) {
        self.fb.fill(white);
    }

    fn draw_text(&mut self, text: &str, at: layout::Point) {
        let style = MonoTextStyle::new(&FONT_10X20, BinaryColor::On);
        let origin = Point::new(at.x, at.y);
        let scale = self.glyph_scale();
        if scale == 1 {
            let _ = Text::with_baseline(text, origin, style, Baseline::Top).draw(&mut self.fb);
        } else {
            let mut target = ScaledTarget {
                inner: &mut self.fb,
                origin,
                scale,
            };
            let _ = Text::with_baseline(text, Point::zero(), style, Baseline::Top).draw(&mut target);
        }
    }

    fn fill_region(&mut self, region: Region, white: bool) {
        if region.is_empty() {
            return;
        }
        let color = if white {
            BinaryColor::Off
        } else {
            BinaryColor::On
        };
        let _ = Rectangle::new(Point::new(region.x, region.y), Size::new(region.w, region.h))
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(&mut self.fb);
    }

    fn set_text_scale(&mut self, scale: u8) {
        self.text_scale = scale.clamp(1, MAX_TEXT_SCALE);
    }

    fn select_font(&mut self, font: Font) {
        self.font = font;
    }

    /// Send everything drawn since the last commit in one panel update
    fn commit(&mut self, mode: RefreshMode) -> Result<(), DisplayError> {
        match self.fb.take_dirty() {
            Some(window) => self.panel.update(self.fb.buffer(), window, mode),
            None => Ok(()),
        }
    }

    /// Drawing only touches the framebuffer and `commit` already sends one
    /// merged window, so the panel needs no transaction bracketing. Only the
    /// nesting depth is kept.
    fn begin_batch(&mut self) {
        self.batch_depth = self.batch_depth.saturating_add(1);
    }

    fn end_batch(&mut self) {
        self.batch_depth = self.batch_depth.saturating_sub(1);
    }
}

/// Draw target that magnifies every pixel into a `scale` x `scale` square
struct ScaledTarget<'a, T> {
    inner: &'a mut T,
    origin: Point,
    scale: u32,
}

impl<T: DrawTarget> OriginDimensions for ScaledTarget<'_, T> {
    fn size(&self) -> Size {
        let size = self.inner.bounding_box().size;
        Size::new(size.width / self.scale, size.height / self.scale)
    }
}

impl<T: DrawTarget> DrawTarget for ScaledTarget<'_, T> {
    type Color = T::Color;
    type Error = T::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let square = Size::new_equal(self.scale);
        for Pixel(point, color) in pixels {
            let top_left = self.origin + point * self.scale as i32;
            self.inner
                .fill_solid(&Rectangle::new(top_left, square), color)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::display::Window;
    use std::vec::Vec;

    const W: u32 = 400;
    const H: u32 = 300;

    #[derive(Default)]
    struct RecordingPanel {
        updates: Vec<(Window, RefreshMode)>,
        fail: Option<DisplayError>,
    }

    impl Panel for RecordingPanel {
        const WIDTH: u32 = W;
        const HEIGHT: u32 = H;

        fn init(&mut self) -> Result<(), DisplayError> {
            self.fail.map_or(Ok(()), Err)
        }

        fn update(
            &mut self,
            frame: &[u8],
            window: Window,
            mode: RefreshMode,
        ) -> Result<(), DisplayError> {
            assert_eq!(frame.len(), (W / 8 * H) as usize);
            self.updates.push((window, mode));
            self.fail.map_or(Ok(()), Err)
        }
    }

    type TestDisplay = EpaperDisplay<RecordingPanel, Vec<u8>>;

    fn display() -> TestDisplay {
        let fb = Framebuffer::new(std::vec![0u8; (W / 8 * H) as usize], W, H).unwrap();
        let mut display = EpaperDisplay::new(RecordingPanel::default(), fb);
        display.init().unwrap();
        display
    }

    fn black_bounds(display: &TestDisplay) -> Option<Window> {
        let size = display.fb.size();
        let mut bounds: Option<Window> = None;
        for y in 0..size.height as i32 {
            for x in 0..size.width as i32 {
                if display.fb.is_white(x, y) == Some(false) {
                    let px = Window::new(x as u32, y as u32, 1, 1);
                    bounds = Some(bounds.map_or(px, |b| b.union(&px)));
                }
            }
        }
        bounds
    }

    #[test]
    fn test_init_failure_mapped() {
        let fb = Framebuffer::new(std::vec![0u8; (W / 8 * H) as usize], W, H).unwrap();
        let mut display = EpaperDisplay::new(
            RecordingPanel {
                fail: Some(DisplayError::Timeout),
                ..RecordingPanel::default()
            },
            fb,
        );
        assert_eq!(display.init(), Err(InitError::Timeout));
    }

    #[test]
    fn test_small_text_stays_in_glyph_cells() {
        let mut display = display();
        display.select_font(Font::Small);
        display.draw_text("bat:080", layout::Point::new(322, 8));

        let ink = black_bounds(&display).unwrap();
        assert!(ink.x >= 322 && ink.x + ink.w <= 322 + 7 * 10);
        assert!(ink.y >= 8 && ink.y + ink.h <= 8 + 20);
    }

    #[test]
    fn test_large_text_scaled() {
        let mut display = display();
        display.select_font(Font::Large);
        display.draw_text("14:37", layout::Point::new(100, 110));

        let ink = black_bounds(&display).unwrap();
        assert!(ink.x >= 100 && ink.x + ink.w <= 100 + 200);
        assert!(ink.y >= 110 && ink.y + ink.h <= 110 + 80);
        // Scaled glyphs are much taller than the small font
        assert!(ink.h > 40);
    }

    #[test]
    fn test_text_scale_clamped() {
        let mut display = display();
        display.set_text_scale(0);
        assert_eq!(display.glyph_scale(), 1);
        display.set_text_scale(200);
        assert_eq!(display.glyph_scale(), MAX_TEXT_SCALE as u32);
        display.select_font(Font::Large);
        display.set_text_scale(2);
        assert_eq!(display.glyph_scale(), 8);
    }

    #[test]
    fn test_fill_region_then_commit_sends_window() {
        let mut display = display();
        display.fill_region(Region::new(100, 110, 200, 80), false);
        display.commit(RefreshMode::Slow).unwrap();

        assert_eq!(
            display.panel().updates,
            [(Window::new(96, 110, 208, 80), RefreshMode::Slow)]
        );
        assert_eq!(display.fb.is_white(100, 110), Some(false));
        assert_eq!(display.fb.is_white(99, 110), Some(true));
    }

    #[test]
    fn test_batched_draws_commit_as_one_window() {
        let mut display = display();
        display.begin_batch();
        display.fill_region(Region::new(0, 0, 8, 8), false);
        display.fill_region(Region::new(392, 292, 8, 8), false);
        display.end_batch();
        assert_eq!(display.batch_depth(), 0);

        display.commit(RefreshMode::Fast).unwrap();
        assert_eq!(
            display.panel().updates,
            [(Window::new(0, 0, W, H), RefreshMode::Fast)]
        );
    }

    #[test]
    fn test_nested_batches_send_nothing() {
        let mut display = display();
        display.begin_batch();
        display.begin_batch();
        assert_eq!(display.batch_depth(), 2);
        display.fill_region(Region::new(16, 16, 8, 8), false);
        display.end_batch();
        assert_eq!(display.batch_depth(), 1);
        display.end_batch();
        display.end_batch();
        assert_eq!(display.batch_depth(), 0);

        // Closing batches never talks to the panel
        assert!(display.panel().updates.is_empty());
        display.commit(RefreshMode::Fast).unwrap();
        assert_eq!(
            display.panel().updates,
            [(Window::new(16, 16, 8, 8), RefreshMode::Fast)]
        );
    }

    #[test]
    fn test_commit_without_changes_is_noop() {
        let mut display = display();
        display.commit(RefreshMode::Slow).unwrap();
        display.fill_region(Region::new(10, 10, 0, 10), false);
        display.commit(RefreshMode::Slow).unwrap();
        assert!(display.panel().updates.is_empty());
    }

    #[test]
    fn test_clear_covers_panel() {
        let mut display = display();
        display.clear(true);
        display.commit(RefreshMode::Slow).unwrap();
        assert_eq!(display.panel().updates[0].0, Window::new(0, 0, W, H));
    }

    #[test]
    fn test_rotation_applies_to_drawing() {
        let mut display = display();
        display.set_rotation(Rotation::Deg90);
        assert_eq!(display.fb.size(), Size::new(H, W));

        display.fill_region(Region::new(0, 0, 4, 4), false);
        // Logical top-left lands on the native top-right corner
        assert_eq!(display.fb.dirty(), Some(Window::new(W - 4, 0, 4, 4)));
    }

    #[test]
    fn test_panel_failure_reported() {
        let mut display = display();
        display.panel.fail = Some(DisplayError::Bus);
        display.clear(true);
        assert_eq!(display.commit(RefreshMode::Slow), Err(DisplayError::Bus));
    }
}
