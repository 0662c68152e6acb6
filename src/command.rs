//! Panel controller command definitions
//!
//! Command bytes for the ST7789-class controllers found on small SPI TFT
//! panels. Commands are sent with the DC pin low, their parameters one byte
//! at a time with DC high.
//!
//! ## Command Structure
//!
//! 1. Set DC low (command mode)
//! 2. Send command byte
//! 3. Set DC high (data mode)
//! 4. Send parameter bytes (if any)
//!
//! ## Example
//!
//! ```rust,no_run
//! use lcdfb::{command, Interface, PanelInterface};
//! # use core::convert::Infallible;
//! # use embedded_hal::digital::OutputPin;
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
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # let mut interface = Interface::new(MockSpi, MockPin);
//! let _ = interface.send_command(command::SLEEP_OUT);
//! let _ = interface.send_command_with(command::INTERFACE_PIXEL_FORMAT, &[command::COLMOD_RGB565]);
//! let _ = interface.send_command(command::DISPLAY_ON);
//! ```

// System control commands

/// Sleep in (0x10)
///
/// Enters minimum power mode. Wait before sending further commands.
pub const SLEEP_IN: u8 = 0x10;

/// Sleep out (0x11)
///
/// Leaves sleep mode. The controller needs up to 120ms before the next
/// sleep in and some time to settle its supplies.
pub const SLEEP_OUT: u8 = 0x11;

/// Display off (0x28)
pub const DISPLAY_OFF: u8 = 0x28;

/// Display on (0x29)
pub const DISPLAY_ON: u8 = 0x29;

// RAM addressing

/// Column address set (0x2A)
///
/// Four parameters: start high, start low, end high, end low.
pub const COLUMN_ADDRESS_SET: u8 = 0x2A;

/// Row address set (0x2B)
///
/// Four parameters: start high, start low, end high, end low.
pub const ROW_ADDRESS_SET: u8 = 0x2B;

/// Memory write (0x2C)
///
/// Following data bytes fill the current address window.
pub const MEMORY_WRITE: u8 = 0x2C;

/// Memory data access control (0x36)
///
/// One parameter made of the `MADCTL_*` bits.
pub const MEMORY_ACCESS_CONTROL: u8 = 0x36;

/// Interface pixel format (0x3A)
///
/// One parameter: [`COLMOD_RGB565`] or [`COLMOD_RGB666`].
pub const INTERFACE_PIXEL_FORMAT: u8 = 0x3A;

// Panel function commands

/// RAM control (0xB0)
///
/// Two parameters; `[0x03, 0xC8]` selects little endian 16-bit pixels.
pub const RAM_CONTROL: u8 = 0xB0;

/// Porch setting (0xB2)
pub const PORCH_CONTROL: u8 = 0xB2;

/// Gate control (0xB7)
pub const GATE_CONTROL: u8 = 0xB7;

/// VCOM setting (0xBB)
pub const VCOM_SETTING: u8 = 0xBB;

/// LCM control (0xC0)
pub const LCM_CONTROL: u8 = 0xC0;

/// VDV and VRH command enable (0xC2)
pub const VDV_VRH_ENABLE: u8 = 0xC2;

/// VRH set (0xC3)
pub const VRH_SET: u8 = 0xC3;

/// VDV set (0xC4)
pub const VDV_SET: u8 = 0xC4;

/// Frame rate control in normal mode (0xC6)
pub const FRAME_RATE_CONTROL: u8 = 0xC6;

/// Power control 1 (0xD0)
pub const POWER_CONTROL_1: u8 = 0xD0;

/// Positive voltage gamma control (0xE0)
///
/// Fourteen parameters.
pub const POSITIVE_GAMMA: u8 = 0xE0;

/// Negative voltage gamma control (0xE1)
///
/// Fourteen parameters.
pub const NEGATIVE_GAMMA: u8 = 0xE1;

// Parameter values

/// 16 bits per pixel
pub const COLMOD_RGB565: u8 = 0x55;

/// 18 bits per pixel, sent as 3 bytes
pub const COLMOD_RGB666: u8 = 0x66;

/// Row address order (MY)
pub const MADCTL_MY: u8 = 0x80;

/// Column address order (MX)
pub const MADCTL_MX: u8 = 0x40;

/// Row/column exchange (MV)
pub const MADCTL_MV: u8 = 0x20;

/// BGR color order
pub const MADCTL_BGR: u8 = 0x08;
