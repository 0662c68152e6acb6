//! Board GPIOs as embedded-hal pins
//!
//! [`LcdPin`] wraps one entry of a display's `lcd_gpio_<n>` table so panel
//! links can take ordinary [`OutputPin`]/[`InputPin`] implementations, the
//! same way [`Interface`](crate::interface::Interface) takes its DC pin.

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::board::Board;
use crate::error::LcdError;
use crate::lcd::Lcd;

/// A board GPIO line of one display
pub struct LcdPin<'a, B: Board> {
    lcd: &'a Lcd<B>,
    index: usize,
}

impl<'a, B: Board> LcdPin<'a, B> {
    /// Wrap GPIO `index` of `lcd`
    pub fn new(lcd: &'a Lcd<B>, index: usize) -> Self {
        Self { lcd, index }
    }

    /// Index into the display's GPIO table
    pub fn index(&self) -> usize {
        self.index
    }
}

impl<B: Board> ErrorType for LcdPin<'_, B> {
    type Error = LcdError;
}

impl<B: Board> OutputPin for LcdPin<'_, B> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.lcd.gpio_set_value(self.index, false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.lcd.gpio_set_value(self.index, true)
    }
}

impl<B: Board> InputPin for LcdPin<'_, B> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.lcd.gpio_get_value(self.index)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.lcd.gpio_get_value(self.index).map(|high| !high)
    }
}
