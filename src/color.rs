//! Pixel formats for framebuffer layers
//!
//! This module defines the [`PixelFormat`] codes used by the `lcd_pixel_fmt`
//! config key and the 32 to 24 bit packing applied when a 32-bpp framebuffer
//! is pushed over a serial link.
//!
//! ## Wire Format
//!
//! | Source            | Wire bytes per pixel |
//! |-------------------|----------------------|
//! | 32-bit (A/X)RGB   | 3 (alpha dropped)    |
//! | 24-bit RGB/BGR    | 3                    |
//! | 16-bit RGB565     | 2                    |
//!
//! ## Example
//!
//! ```
//! use lcdfb::color::{pack_rgb32_to_rgb24, PixelFormat};
//!
//! assert_eq!(PixelFormat::from_code(0x0a), Some(PixelFormat::Rgb565));
//! assert_eq!(PixelFormat::Argb8888.wire_bytes_per_pixel(), 3);
//!
//! let src = [0x11, 0x22, 0x33, 0xFF, 0x44, 0x55, 0x66, 0xFF];
//! let mut dst = [0u8; 6];
//! pack_rgb32_to_rgb24(&src, &mut dst);
//! assert_eq!(dst, [0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
//! ```

/// Framebuffer pixel formats
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum PixelFormat {
    /// 32-bit ARGB
    #[default]
    Argb8888 = 0x00,
    /// 32-bit ABGR
    Abgr8888 = 0x01,
    /// 32-bit RGBA
    Rgba8888 = 0x02,
    /// 32-bit BGRA
    Bgra8888 = 0x03,
    /// 32-bit XRGB
    Xrgb8888 = 0x04,
    /// 32-bit XBGR
    Xbgr8888 = 0x05,
    /// 32-bit RGBX
    Rgbx8888 = 0x06,
    /// 32-bit BGRX
    Bgrx8888 = 0x07,
    /// 24-bit RGB
    Rgb888 = 0x08,
    /// 24-bit BGR
    Bgr888 = 0x09,
    /// 16-bit RGB565
    Rgb565 = 0x0a,
    /// 16-bit BGR565
    Bgr565 = 0x0b,
}

impl PixelFormat {
    /// Look up a format by its config code
    pub const fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0x00 => Self::Argb8888,
            0x01 => Self::Abgr8888,
            0x02 => Self::Rgba8888,
            0x03 => Self::Bgra8888,
            0x04 => Self::Xrgb8888,
            0x05 => Self::Xbgr8888,
            0x06 => Self::Rgbx8888,
            0x07 => Self::Bgrx8888,
            0x08 => Self::Rgb888,
            0x09 => Self::Bgr888,
            0x0a => Self::Rgb565,
            0x0b => Self::Bgr565,
            _ => return None,
        })
    }

    /// Whether this is one of the 16-bit formats
    pub const fn is_rgb565(self) -> bool {
        matches!(self, Self::Rgb565 | Self::Bgr565)
    }

    /// Bytes per pixel once on the wire
    pub const fn wire_bytes_per_pixel(self) -> usize {
        if self.is_rgb565() { 2 } else { 3 }
    }
}

/// Pack 32-bit pixels into 24-bit wire pixels
///
/// Copies the first three bytes of every 4-byte source pixel. Stops at the
/// end of whichever slice runs out first.
pub fn pack_rgb32_to_rgb24(src: &[u8], dst: &mut [u8]) {
    for (out, pixel) in dst.chunks_exact_mut(3).zip(src.chunks_exact(4)) {
        out.copy_from_slice(&pixel[..3]);
    }
}
