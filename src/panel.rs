//! Panel plugin interface
//!
//! Every concrete panel implements [`Panel`]. Only [`Panel::name`] is
//! required; each capability has a default that reports
//! [`LcdError::NotSupported`], which the engine treats as "capability
//! absent" and skips.
//!
//! A panel is bound to a display by [`Lcd::set_panel_func`] or
//! [`Registry::register_panel`](crate::registry::Registry::register_panel),
//! matching [`Panel::name`] against the display's `lcd_driver_name`.
//!
//! ## Example
//!
//! ```
//! use lcdfb::{Board, Lcd, LcdError, Panel};
//!
//! struct Blinker;
//!
//! impl<B: Board> Panel<B> for Blinker {
//!     fn name(&self) -> &str {
//!         "blinker"
//!     }
//!
//!     fn cfg_open_flow(&self, lcd: &Lcd<B>) -> Result<(), LcdError> {
//!         lcd.set_open_func(|lcd| { let _ = lcd.power_enable(0); }, 20)?;
//!         lcd.set_open_func(|lcd| { let _ = lcd.backlight_enable(); }, 0)
//!     }
//! }
//! ```

use crate::board::Board;
use crate::error::LcdError;
use crate::gamma::PanelExtendInfo;
use crate::lcd::Lcd;

/// Visible screen geometry of a framebuffer layer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VarScreenInfo {
    /// Visible width in pixels
    pub xres: u32,
    /// Visible height in pixels
    pub yres: u32,
    /// Horizontal pan offset
    pub xoffset: u32,
    /// Vertical pan offset in lines
    pub yoffset: u32,
    /// Source bits per pixel
    pub bits_per_pixel: u32,
}

/// A framebuffer layer handed to [`Lcd::set_layer`]
#[derive(Clone, Copy, Debug)]
pub struct FbInfo<'a> {
    /// Visible geometry
    pub var: VarScreenInfo,
    /// Bytes per source line
    pub line_length: u32,
    /// Framebuffer memory
    pub screen: &'a [u8],
}

/// Capability set of a panel plugin
#[allow(unused_variables)]
pub trait Panel<B: Board>: Send + Sync {
    /// Driver name matched against `lcd_driver_name`
    fn name(&self) -> &str;

    /// Adjust the extended panel parameters when the panel is bound
    fn cfg_panel_info(&self, info: &mut PanelExtendInfo) -> Result<(), LcdError> {
        Err(LcdError::NotSupported)
    }

    /// Register open-flow steps with [`Lcd::set_open_func`]
    fn cfg_open_flow(&self, lcd: &Lcd<B>) -> Result<(), LcdError> {
        Err(LcdError::NotSupported)
    }

    /// Register close-flow steps with [`Lcd::set_close_func`]
    fn cfg_close_flow(&self, lcd: &Lcd<B>) -> Result<(), LcdError> {
        Err(LcdError::NotSupported)
    }

    /// Panel specific escape hatch
    fn user_defined_func(
        &self,
        lcd: &Lcd<B>,
        para1: u32,
        para2: u32,
        para3: u32,
    ) -> Result<i32, LcdError> {
        Err(LcdError::NotSupported)
    }

    /// Receive the curve-adjusted brightness
    fn set_bright(&self, lcd: &Lcd<B>, bright: u32) -> Result<(), LcdError> {
        Err(LcdError::NotSupported)
    }

    /// Push one group of lines already in wire format
    fn set_layer(&self, lcd: &Lcd<B>, data: &[u8]) -> Result<(), LcdError> {
        Err(LcdError::NotSupported)
    }

    /// Blank or unblank the panel
    fn blank(&self, lcd: &Lcd<B>, enable: bool) -> Result<(), LcdError> {
        Err(LcdError::NotSupported)
    }

    /// Apply a new visible geometry
    fn set_var(&self, lcd: &Lcd<B>, var: &VarScreenInfo) -> Result<(), LcdError> {
        Err(LcdError::NotSupported)
    }

    /// Set the panel's RAM address window
    fn set_addr_win(
        &self,
        lcd: &Lcd<B>,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<(), LcdError> {
        Err(LcdError::NotSupported)
    }
}
