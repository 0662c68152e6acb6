//! Graphics support via embedded-graphics
//!
//! This module provides the [`FrameBuffer`] struct, a 32 bits per pixel
//! buffer implementing the [`DrawTarget`] trait from the embedded-graphics
//! ecosystem. Pixels are stored as `[b, g, r, 0xff]`, the same layout a
//! host framebuffer hands to [`Lcd::set_layer`], so a flush packs them to
//! 24-bit wire pixels on the way to the panel.
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_graphics::{
//!     pixelcolor::Rgb888,
//!     prelude::*,
//!     primitives::{PrimitiveStyle, Rectangle},
//! };
//! use lcdfb::config::Builder;
//! use lcdfb::FrameBuffer;
//!
//! let info = Builder::new().resolution(240, 320).build();
//! let mut fb = FrameBuffer::from_panel(&info);
//!
//! let _ = fb.clear(Rgb888::BLACK);
//! let _ = Rectangle::new(Point::new(10, 10), Size::new(50, 30))
//!     .into_styled(PrimitiveStyle::with_fill(Rgb888::RED))
//!     .draw(&mut fb);
//!
//! // then `fb.flush(&lcd)` once a display is enabled
//! ```

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    pixelcolor::{Rgb888, RgbColor},
    Pixel,
};

use crate::board::Board;
use crate::config::PanelInfo;
use crate::error::LcdError;
use crate::lcd::Lcd;
use crate::panel::{FbInfo, VarScreenInfo};

/// Bytes per stored pixel
const BYTES_PER_PIXEL: usize = 4;

/// 32-bpp drawing surface for one display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    buffer: Vec<u8>,
}

impl FrameBuffer {
    /// Create a black buffer of `width` x `height` pixels
    pub fn new(width: u32, height: u32) -> Self {
        let mut buffer = vec![0u8; width as usize * height as usize * BYTES_PER_PIXEL];
        for pixel in buffer.chunks_exact_mut(BYTES_PER_PIXEL) {
            pixel[3] = 0xff;
        }
        Self {
            width,
            height,
            buffer,
        }
    }

    /// Create a buffer matching the panel resolution
    pub fn from_panel(info: &PanelInfo) -> Self {
        let (x, y) = info.resolution();
        Self::new(x, y)
    }

    /// Bytes per line
    pub fn line_length(&self) -> u32 {
        self.width * BYTES_PER_PIXEL as u32
    }

    /// Raw pixel bytes
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Framebuffer description of the whole buffer
    pub fn fb_info(&self) -> FbInfo<'_> {
        FbInfo {
            var: VarScreenInfo {
                xres: self.width,
                yres: self.height,
                xoffset: 0,
                yoffset: 0,
                bits_per_pixel: 32,
            },
            line_length: self.line_length(),
            screen: &self.buffer,
        }
    }

    /// Send the buffer to the display's panel
    ///
    /// # Errors
    ///
    /// Returns [`LcdError::InvalidLayer`] for an empty buffer and whatever
    /// the panel's layer callback reports.
    pub fn flush<B: Board>(&self, lcd: &Lcd<B>) -> Result<(), LcdError> {
        lcd.set_layer(&self.fb_info())
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: Rgb888) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        self.buffer[offset..offset + BYTES_PER_PIXEL]
            .copy_from_slice(&[color.b(), color.g(), color.r(), 0xff]);
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(Point { x, y }, color) in pixels {
            if x < 0 || y < 0 {
                continue;
            }
            self.set_pixel(x as u32, y as u32, color);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let pixel = [color.b(), color.g(), color.r(), 0xff];
        for chunk in self.buffer.chunks_exact_mut(BYTES_PER_PIXEL) {
            chunk.copy_from_slice(&pixel);
        }
        Ok(())
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Builder, MemoryStore};
    use crate::mock::{MockBoard, MockPanel};
    use alloc::sync::Arc;
    use embedded_graphics::prelude::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn test_new_buffer_is_opaque_black() {
        let fb = FrameBuffer::new(2, 3);
        assert_eq!(fb.buffer().len(), 24);
        assert_eq!(&fb.buffer()[..8], &[0, 0, 0, 0xff, 0, 0, 0, 0xff]);
        assert_eq!(fb.size(), Size::new(2, 3));
    }

    #[test]
    fn test_from_panel_uses_resolution() {
        let info = Builder::new().resolution(240, 320).build();
        let fb = FrameBuffer::from_panel(&info);
        assert_eq!(fb.size(), Size::new(240, 320));
        assert_eq!(fb.line_length(), 960);
    }

    #[test]
    fn test_pixel_byte_order() {
        let mut fb = FrameBuffer::new(2, 2);
        Pixel(Point::new(1, 1), Rgb888::new(0x11, 0x22, 0x33))
            .draw(&mut fb)
            .unwrap();
        assert_eq!(&fb.buffer()[12..], &[0x33, 0x22, 0x11, 0xff]);
    }

    #[test]
    fn test_out_of_bounds_pixels_are_ignored() {
        let mut fb = FrameBuffer::new(2, 2);
        let before = fb.clone();
        fb.draw_iter([
            Pixel(Point::new(-1, 0), Rgb888::WHITE),
            Pixel(Point::new(2, 0), Rgb888::WHITE),
            Pixel(Point::new(0, 5), Rgb888::WHITE),
        ])
        .unwrap();
        assert_eq!(fb, before);
    }

    #[test]
    fn test_rectangle_fill() {
        let mut fb = FrameBuffer::new(4, 4);
        Rectangle::new(Point::new(1, 1), Size::new(2, 2))
            .into_styled(PrimitiveStyle::with_fill(Rgb888::RED))
            .draw(&mut fb)
            .unwrap();
        let red = [0, 0, 0xff, 0xff];
        let offset = (4 + 1) * 4;
        assert_eq!(&fb.buffer()[offset..offset + 4], &red);
        assert_eq!(&fb.buffer()[..4], &[0, 0, 0, 0xff]);
    }

    #[test]
    fn test_fb_info_describes_buffer() {
        let fb = FrameBuffer::new(3, 2);
        let info = fb.fb_info();
        assert_eq!(info.var.xres, 3);
        assert_eq!(info.var.yres, 2);
        assert_eq!(info.var.bits_per_pixel, 32);
        assert_eq!(info.line_length, 12);
        assert_eq!(info.screen.len(), 24);
    }

    #[test]
    fn test_flush_packs_to_wire_pixels() {
        let store = MemoryStore::new()
            .with_u32("lcd_fb0", "lcd_used", 1)
            .with_str("lcd_fb0", "lcd_driver_name", "mock")
            .with_u32("lcd_fb0", "lcd_x", 2)
            .with_u32("lcd_fb0", "lcd_y", 2);
        let lcd = Lcd::from_store(0, Arc::new(MockBoard::new()), &store);
        let panel = MockPanel::new("mock");
        lcd.set_panel_func("mock", Arc::new(panel.clone())).unwrap();

        let mut fb = FrameBuffer::new(2, 2);
        fb.clear(Rgb888::new(1, 2, 3)).unwrap();
        fb.flush(&lcd).unwrap();

        let sent: Vec<u8> = panel.layers().concat();
        assert_eq!(sent, [3u8, 2, 1].repeat(4));
    }
}
