//! 1-bit framebuffer with rotation and dirty-window tracking
//!
//! Implements the `embedded-graphics` [`DrawTarget`] in the logical
//! (rotated) orientation and stores pixels in the panel's native one.
//! [`BinaryColor::On`] is ink (black), [`BinaryColor::Off`] is paper.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use horae_core::layout::Rotation;

/// Framebuffer construction errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FramebufferError {
    /// Width is not a multiple of 8
    UnalignedWidth,
    /// Buffer cannot hold `width * height` bits
    BufferTooSmall { required: usize, provided: usize },
}

/// A rectangle in native panel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Window {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Window {
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Smallest window covering both
    pub fn union(&self, other: &Window) -> Window {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = (self.x + self.w).max(other.x + other.w);
        let y1 = (self.y + self.h).max(other.y + other.h);
        Window::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Widen horizontally to whole bytes
    pub fn byte_aligned(&self) -> Window {
        let x0 = self.x & !7;
        let x1 = (self.x + self.w + 7) & !7;
        Window::new(x0, self.y, x1 - x0, self.h)
    }
}

/// 1-bit framebuffer over caller-provided storage
pub struct Framebuffer<B> {
    buf: B,
    width: u32,
    height: u32,
    rotation: Rotation,
    dirty: Option<Window>,
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> Framebuffer<B> {
    /// Wrap `buf` as a white `width` x `height` frame
    ///
    /// # Arguments
    /// - `width`, `height`: native panel size; width must be a multiple of 8
    pub fn new(mut buf: B, width: u32, height: u32) -> Result<Self, FramebufferError> {
        if width % 8 != 0 {
            return Err(FramebufferError::UnalignedWidth);
        }
        let required = Self::buffer_len(width, height);
        let provided = buf.as_ref().len();
        if provided < required {
            return Err(FramebufferError::BufferTooSmall { required, provided });
        }
        buf.as_mut()[..required].fill(0xFF);
        Ok(Self {
            buf,
            width,
            height,
            rotation: Rotation::Deg0,
            dirty: None,
        })
    }

    /// Bytes needed for a frame
    pub const fn buffer_len(width: u32, height: u32) -> usize {
        (width / 8 * height) as usize
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Frame bytes in native orientation
    pub fn buffer(&self) -> &[u8] {
        &self.buf.as_ref()[..Self::buffer_len(self.width, self.height)]
    }

    /// Fill the whole frame
    pub fn fill(&mut self, white: bool) {
        let len = Self::buffer_len(self.width, self.height);
        self.buf.as_mut()[..len].fill(if white { 0xFF } else { 0x00 });
        self.mark(Window::new(0, 0, self.width, self.height));
    }

    /// Set a pixel in logical coordinates; out-of-bounds pixels are dropped
    pub fn set_pixel(&mut self, x: i32, y: i32, white: bool) {
        let Some((nx, ny)) = self.to_native(x, y) else {
            return;
        };
        let index = (ny * (self.width / 8) + nx / 8) as usize;
        let bit = 0x80u8 >> (nx % 8);
        let byte = &mut self.buf.as_mut()[index];
        if white {
            *byte |= bit;
        } else {
            *byte &= !bit;
        }
        self.mark(Window::new(nx, ny, 1, 1));
    }

    /// Read a pixel in logical coordinates
    pub fn is_white(&self, x: i32, y: i32) -> Option<bool> {
        let (nx, ny) = self.to_native(x, y)?;
        let index = (ny * (self.width / 8) + nx / 8) as usize;
        Some(self.buf.as_ref()[index] & (0x80 >> (nx % 8)) != 0)
    }

    /// Window changed since the last [`Self::take_dirty`]
    pub fn dirty(&self) -> Option<Window> {
        self.dirty
    }

    /// Return the byte-aligned changed window and start tracking afresh
    pub fn take_dirty(&mut self) -> Option<Window> {
        self.dirty.take().map(|w| w.byte_aligned())
    }

    fn mark(&mut self, window: Window) {
        self.dirty = Some(match self.dirty {
            Some(dirty) => dirty.union(&window),
            None => window,
        });
    }

    fn to_native(&self, x: i32, y: i32) -> Option<(u32, u32)> {
        let size = self.size();
        if x < 0 || y < 0 || x as u32 >= size.width || y as u32 >= size.height {
            return None;
        }
        let (x, y) = (x as u32, y as u32);
        let (w, h) = (self.width, self.height);
        Some(match self.rotation {
            Rotation::Deg0 => (x, y),
            Rotation::Deg90 => (w - 1 - y, x),
            Rotation::Deg180 => (w - 1 - x, h - 1 - y),
            Rotation::Deg270 => (y, h - 1 - x),
        })
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> OriginDimensions for Framebuffer<B> {
    fn size(&self) -> Size {
        if self.rotation.is_portrait() {
            Size::new(self.height, self.width)
        } else {
            Size::new(self.width, self.height)
        }
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> DrawTarget for Framebuffer<B> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color.is_off());
        }
        Ok(())
    }
}
