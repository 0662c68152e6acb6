//! Panel link abstraction
//!
//! This module provides the [`PanelInterface`] trait and the [`Interface`]
//! struct for talking to a panel controller over SPI with a separate
//! data/command select line.
//!
//! ## Hardware Requirements
//!
//! - SPI bus (MOSI + SCK, chip select owned by the [`SpiDevice`])
//! - **DC**: Data/Command select (output, low = command, high = data)
//!
//! Reset is not part of the link; panels drive it through the display's
//! board GPIO table.
//!
//! ## Transfers
//!
//! | Call               | DC   | Payload           |
//! |--------------------|------|-------------------|
//! | `send_command`     | low  | one command byte  |
//! | `send_register`    | high | one parameter byte|
//! | `send_burst`       | high | pixel data        |
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_hal::digital::OutputPin;
//! use embedded_hal::spi::{Operation, SpiDevice};
//! use lcdfb::{Interface, PanelInterface};
//! # use core::convert::Infallible;
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
//! let mut interface = Interface::new(MockSpi, MockPin);
//!
//! // Sleep out
//! let _ = interface.send_command(0x11);
//!
//! // Column address set with four parameter bytes
//! let _ = interface.send_command_with(0x2A, &[0x00, 0x00, 0x00, 0xEF]);
//!
//! // Pixel data
//! let _ = interface.send_burst(&[0x00; 480]);
//! ```

use core::fmt::Debug;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;

type InterfaceResult<T, E> = core::result::Result<T, E>;

/// Trait for the serial link to a panel controller
///
/// ## Implementing
///
/// For most cases, use the provided [`Interface`] struct. Implement this
/// trait yourself for links with a different command/data framing, such as
/// 9-bit SPI.
pub trait PanelInterface {
    /// Error type for link operations
    type Error: Debug;

    /// Send a command byte with DC low
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication or GPIO fails.
    fn send_command(&mut self, command: u8) -> InterfaceResult<(), Self::Error>;

    /// Send a single parameter byte with DC high
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication or GPIO fails.
    fn send_register(&mut self, value: u8) -> InterfaceResult<(), Self::Error>;

    /// Send a block of data bytes with DC high in one transfer
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication or GPIO fails.
    fn send_burst(&mut self, data: &[u8]) -> InterfaceResult<(), Self::Error>;

    /// Send a command followed by its parameters one byte per transfer
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication or GPIO fails.
    fn send_command_with(&mut self, command: u8, params: &[u8]) -> InterfaceResult<(), Self::Error> {
        self.send_command(command)?;
        for &value in params {
            self.send_register(value)?;
        }
        Ok(())
    }
}

/// Errors that can occur at the link level
///
/// Generic over SPI and GPIO error types.
#[derive(Debug)]
pub enum InterfaceError<SpiErr, PinErr> {
    /// SPI communication error
    Spi(SpiErr),
    /// GPIO pin error
    Pin(PinErr),
}

impl<SpiErr: Debug, PinErr: Debug> core::fmt::Display for InterfaceError<SpiErr, PinErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Spi(e) => write!(f, "SPI error: {e:?}"),
            Self::Pin(e) => write!(f, "Pin error: {e:?}"),
        }
    }
}

impl<SpiErr: Debug, PinErr: Debug> core::error::Error for InterfaceError<SpiErr, PinErr> {}

/// SPI + DC link implementing [`PanelInterface`]
///
/// ## Type Parameters
///
/// * `SPI` - SPI device implementing [`SpiDevice`]
/// * `DC` - Data/Command pin implementing [`OutputPin`]
pub struct Interface<SPI, DC> {
    /// SPI device for communication
    spi: SPI,
    /// Data/Command select pin (low=command, high=data)
    dc: DC,
}

impl<SPI, DC> Interface<SPI, DC>
where
    SPI: SpiDevice,
    DC: OutputPin,
{
    /// Create a new Interface
    pub fn new(spi: SPI, dc: DC) -> Self {
        Self { spi, dc }
    }

    /// Give back the SPI device and DC pin
    pub fn release(self) -> (SPI, DC) {
        (self.spi, self.dc)
    }
}

impl<SPI, DC> PanelInterface for Interface<SPI, DC>
where
    SPI: SpiDevice,
    SPI::Error: Debug,
    DC: OutputPin,
    DC::Error: Debug,
{
    type Error = InterfaceError<SPI::Error, DC::Error>;

    fn send_command(&mut self, command: u8) -> InterfaceResult<(), Self::Error> {
        self.dc.set_low().map_err(InterfaceError::Pin)?;
        self.spi.write(&[command]).map_err(InterfaceError::Spi)
    }

    fn send_register(&mut self, value: u8) -> InterfaceResult<(), Self::Error> {
        self.dc.set_high().map_err(InterfaceError::Pin)?;
        self.spi.write(&[value]).map_err(InterfaceError::Spi)
    }

    fn send_burst(&mut self, data: &[u8]) -> InterfaceResult<(), Self::Error> {
        self.dc.set_high().map_err(InterfaceError::Pin)?;
        self.spi.write(data).map_err(InterfaceError::Spi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSpi;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    #[derive(Default)]
    struct MockPin {
        levels: Vec<bool>,
    }

    impl ErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.levels.push(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.levels.push(true);
            Ok(())
        }
    }

    #[test]
    fn test_command_then_registers() {
        let spi = MockSpi::default();
        let mut interface = Interface::new(spi.clone(), MockPin::default());
        interface.send_command_with(0x2A, &[0x00, 0xEF]).unwrap();

        let (_, dc) = interface.release();
        assert_eq!(dc.levels, [false, true, true]);
        assert_eq!(spi.writes(), [vec![0x2Au8], vec![0x00], vec![0xEF]]);
    }

    #[test]
    fn test_burst_is_single_transfer() {
        let spi = MockSpi::default();
        let mut interface = Interface::new(spi.clone(), MockPin::default());
        interface.send_burst(&[1, 2, 3, 4]).unwrap();

        let (_, dc) = interface.release();
        assert_eq!(dc.levels, [true]);
        assert_eq!(spi.writes(), [vec![1u8, 2, 3, 4]]);
    }

    #[test]
    fn test_interface_error_display() {
        let err: InterfaceError<u8, u8> = InterfaceError::Spi(3);
        assert_eq!(alloc::format!("{err}"), "SPI error: 3");
    }
}
