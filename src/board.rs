//! Board resource controllers
//!
//! This module provides the [`Board`] trait: the narrow interface through
//! which the lifecycle engine reaches the platform's regulators, GPIO lines,
//! pin controller and PWM channels, plus the blocking delay used between
//! flow steps.
//!
//! ## Implementing
//!
//! A `Board` is shared by every display slot and may be called from any
//! thread, so all methods take `&self`. Implementations are expected to
//! synchronize internally, the same way the kernel regulator and GPIO
//! subsystems do.
//!
//! Failures are reported as [`ResourceError`]. Inside enable/disable
//! sequences the engine logs them and carries on.

use embedded_hal::delay::DelayNs;

use crate::error::ResourceError;

/// Multiplexer setting that parks a pin in its disabled function
pub const GPIO_MUX_DISABLED: u32 = 7;

/// GPIO line description from the board config
///
/// Mirrors the `(pin, mode, data)` tuple stored under `lcd_gpio_<n>` and
/// `lcd_bl_en` config keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GpioConfig {
    /// Global GPIO number
    pub gpio: u32,
    /// Pin multiplexer function (1 = output, [`GPIO_MUX_DISABLED`] = off)
    pub mul_sel: u32,
    /// Initial output level
    pub data: u32,
}

impl GpioConfig {
    /// Create a GPIO description
    pub const fn new(gpio: u32, mul_sel: u32, data: u32) -> Self {
        Self { gpio, mul_sel, data }
    }

    /// Same line, parked in its disabled multiplexer function
    pub const fn disabled(self) -> Self {
        Self {
            mul_sel: GPIO_MUX_DISABLED,
            ..self
        }
    }
}

/// Handle to a requested GPIO line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GpioHandle(pub u32);

/// Handle to a requested PWM channel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PwmHandle(pub u32);

/// GPIO direction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Input
    Input,
    /// Output
    Output,
}

/// Pin controller state for the display's pin group
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinState {
    /// Pins routed to the display controller
    Active,
    /// Pins parked for low power
    Sleep,
}

/// PWM output polarity
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Polarity {
    /// Active high duty cycle
    #[default]
    Normal,
    /// Active low duty cycle
    Inversed,
}

impl Polarity {
    /// Polarity from the `lcd_pwm_pol` config value
    pub const fn from_config(value: u32) -> Self {
        if value == 0 {
            Self::Normal
        } else {
            Self::Inversed
        }
    }

    /// The opposite polarity
    #[must_use]
    pub const fn inverted(self) -> Self {
        match self {
            Self::Normal => Self::Inversed,
            Self::Inversed => Self::Normal,
        }
    }
}

/// Platform resource controllers used by the lifecycle engine
pub trait Board: Send + Sync + 'static {
    /// Blocking delay provider
    type Delay: DelayNs;

    /// Get a delay provider for blocking waits on the calling thread
    fn delay(&self) -> Self::Delay;

    /// Enable a named power rail
    fn power_enable(&self, name: &str) -> Result<(), ResourceError>;

    /// Disable a named power rail
    fn power_disable(&self, name: &str) -> Result<(), ResourceError>;

    /// Request a GPIO line and apply its multiplexer setting and level
    fn gpio_request(&self, gpio: &GpioConfig) -> Result<GpioHandle, ResourceError>;

    /// Release a GPIO line
    fn gpio_release(&self, handle: GpioHandle);

    /// Drive an output line
    fn gpio_set_value(&self, handle: GpioHandle, high: bool) -> Result<(), ResourceError>;

    /// Read a line level
    fn gpio_get_value(&self, handle: GpioHandle) -> Result<bool, ResourceError>;

    /// Change a line direction
    fn gpio_set_direction(
        &self,
        handle: GpioHandle,
        direction: Direction,
    ) -> Result<(), ResourceError>;

    /// Switch the pin group of a device to the given state
    fn pin_set_state(&self, device: &str, state: PinState) -> Result<(), ResourceError>;

    /// Request a PWM channel
    fn pwm_request(&self, channel: u32) -> Result<PwmHandle, ResourceError>;

    /// Program duty and period in nanoseconds
    fn pwm_config(&self, pwm: PwmHandle, duty_ns: u32, period_ns: u32)
    -> Result<(), ResourceError>;

    /// Set output polarity
    fn pwm_set_polarity(&self, pwm: PwmHandle, polarity: Polarity) -> Result<(), ResourceError>;

    /// Start the PWM output
    fn pwm_enable(&self, pwm: PwmHandle) -> Result<(), ResourceError>;

    /// Stop the PWM output
    fn pwm_disable(&self, pwm: PwmHandle) -> Result<(), ResourceError>;
}
