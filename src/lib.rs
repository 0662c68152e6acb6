//! LCD Framebuffer Panel Driver
//!
//! Per-display lifecycle, backlight and gamma engine for small SPI TFT
//! panels driven through a host framebuffer.
//!
//! ## Features
//!
//! - `no_std` compatible (needs `alloc`)
//! - `embedded-hal` v1.0 support
//! - `embedded-graphics` integration (with `graphics` feature)
//! - Config driven power rails, GPIOs and PWM backlight
//! - Panel plugins with ordered open/close flows
//! - Brightness curve, dimming and gamma color adjustment
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use lcdfb::board::*;
//! use lcdfb::config::MemoryStore;
//! use lcdfb::panels::Kld2844b;
//! use lcdfb::{Board, Registry, ResourceError};
//! # use core::convert::Infallible;
//! # use embedded_hal::spi::{Operation, SpiDevice};
//! # struct MockSpi;
//! # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
//! # impl SpiDevice for MockSpi {
//! #     fn transaction(
//! #         &mut self,
//! #         _operations: &mut [Operation<'_, u8>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! # struct MockDelay;
//! # impl embedded_hal::delay::DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # struct MyBoard;
//! # impl Board for MyBoard {
//! #     type Delay = MockDelay;
//! #     fn delay(&self) -> MockDelay { MockDelay }
//! #     fn power_enable(&self, _: &str) -> Result<(), ResourceError> { Ok(()) }
//! #     fn power_disable(&self, _: &str) -> Result<(), ResourceError> { Ok(()) }
//! #     fn gpio_request(&self, g: &GpioConfig) -> Result<GpioHandle, ResourceError> { Ok(GpioHandle(g.gpio)) }
//! #     fn gpio_release(&self, _: GpioHandle) {}
//! #     fn gpio_set_value(&self, _: GpioHandle, _: bool) -> Result<(), ResourceError> { Ok(()) }
//! #     fn gpio_get_value(&self, _: GpioHandle) -> Result<bool, ResourceError> { Ok(false) }
//! #     fn gpio_set_direction(&self, _: GpioHandle, _: Direction) -> Result<(), ResourceError> { Ok(()) }
//! #     fn pin_set_state(&self, _: &str, _: PinState) -> Result<(), ResourceError> { Ok(()) }
//! #     fn pwm_request(&self, c: u32) -> Result<PwmHandle, ResourceError> { Ok(PwmHandle(c)) }
//! #     fn pwm_config(&self, _: PwmHandle, _: u32, _: u32) -> Result<(), ResourceError> { Ok(()) }
//! #     fn pwm_set_polarity(&self, _: PwmHandle, _: Polarity) -> Result<(), ResourceError> { Ok(()) }
//! #     fn pwm_enable(&self, _: PwmHandle) -> Result<(), ResourceError> { Ok(()) }
//! #     fn pwm_disable(&self, _: PwmHandle) -> Result<(), ResourceError> { Ok(()) }
//! # }
//! let store = MemoryStore::new()
//!     .with_u32("lcd_fb0", "lcd_used", 1)
//!     .with_str("lcd_fb0", "lcd_driver_name", "kld2844b")
//!     .with_u32("lcd_fb0", "lcd_x", 240)
//!     .with_u32("lcd_fb0", "lcd_y", 320);
//!
//! let registry = Registry::init(Arc::new(MyBoard), &store, &mut ());
//! registry.register_panel(Arc::new(Kld2844b::new(MockSpi)));
//!
//! if let Ok(lcd) = registry.get(0) {
//!     let _ = lcd.enable();
//!     let _ = lcd.set_bright(200);
//! }
//! registry.exit(&mut ());
//! ```

#![no_std]

extern crate alloc;
#[cfg(test)]
extern crate std;

/// Board resource seam: power rails, GPIOs, pin states and PWM
pub mod board;
/// Framebuffer pixel formats
pub mod color;
/// Panel controller command definitions
pub mod command;
/// Display configuration types and builder
pub mod config;
/// Brightness curve interpolation
pub mod curve;
/// Error types for the driver
pub mod error;
/// Panel open/close flows
pub mod flow;
/// Gamma tables and color adjustment
pub mod gamma;
/// Panel link abstraction
pub mod interface;
/// Per-display engine
pub mod lcd;
/// Panel plugin trait
pub mod panel;
/// Concrete panel plugins
pub mod panels;
/// Display GPIOs as embedded-hal pins
pub mod pin;
/// Display slot registry
pub mod registry;

/// Graphics support via embedded-graphics (requires `graphics` feature)
#[cfg(feature = "graphics")]
pub mod graphics;

#[cfg(test)]
mod mock;

pub use board::Board;
pub use color::PixelFormat;
pub use config::{Builder, ConfigStore, LcdConfig, MemoryStore, PanelInfo};
pub use error::{LcdError, ResourceError};
pub use interface::{Interface, InterfaceError, PanelInterface};
pub use lcd::{Lcd, LcdStatus};
pub use panel::{FbInfo, Panel, VarScreenInfo};
pub use pin::LcdPin;
pub use registry::{DeviceHost, Registry};

#[cfg(feature = "graphics")]
pub use graphics::FrameBuffer;
