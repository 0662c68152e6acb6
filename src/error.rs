//! Error types for the driver
//!
//! This module defines the errors returned by the lifecycle engine
//! ([`LcdError`]) and by the board resource controllers ([`ResourceError`]).
//!
//! ## Error Types
//!
//! - [`LcdError`] - Errors returned from the lifecycle API
//! - [`ResourceError`] - Failures reported by a [`Board`](crate::board::Board)
//! - [`InterfaceError`](crate::interface::InterfaceError) - Low-level panel link errors
//!
//! ## Propagation
//!
//! The engine is a best-effort hardware sequencer. A failed power rail, GPIO
//! or PWM operation inside an enable/disable sequence is logged and the
//! sequence continues; such failures only reach the caller from the single
//! resource pass-through calls ([`Lcd::power_enable`](crate::Lcd::power_enable),
//! [`Lcd::gpio_set_value`](crate::Lcd::gpio_set_value), ...).
//!
//! ## Example
//!
//! ```
//! use lcdfb::{LcdError, ResourceError};
//!
//! let err = LcdError::from(ResourceError::NotPresent);
//! assert!(matches!(err, LcdError::Resource(ResourceError::NotPresent)));
//! assert!(LcdError::NotSupported.is_not_supported());
//! ```

/// Errors reported by board resource controllers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceError {
    /// The named regulator or pin group does not exist
    NotFound,
    /// The resource was never requested or has already been released
    NotPresent,
    /// The resource is held by another consumer
    Busy,
    /// The controller rejected the operation
    Io,
}

impl core::fmt::Display for ResourceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "resource not found"),
            Self::NotPresent => write!(f, "resource not requested"),
            Self::Busy => write!(f, "resource busy"),
            Self::Io => write!(f, "resource controller error"),
        }
    }
}

impl core::error::Error for ResourceError {}

/// Errors that can occur when driving an LCD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LcdError {
    /// No display is registered at the requested index
    InvalidHandle,
    /// Backlight is already in the requested state
    Busy,
    /// A board resource controller failed
    Resource(ResourceError),
    /// The bound panel does not implement the requested capability
    NotSupported,
    /// Resource index outside the configured table
    InvalidIndex {
        /// Requested index
        index: usize,
        /// Table size
        max: usize,
    },
    /// The flow step list is already at capacity
    FlowFull,
    /// The panel name does not match the display's configured driver
    PanelMismatch,
    /// The framebuffer description does not fit its memory
    InvalidLayer,
    /// The panel link failed or is not initialized
    Bus,
}

impl LcdError {
    /// Whether this error only signals a missing panel capability
    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported)
    }
}

impl From<ResourceError> for LcdError {
    fn from(err: ResourceError) -> Self {
        Self::Resource(err)
    }
}

impl core::fmt::Display for LcdError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidHandle => write!(f, "Invalid display handle"),
            Self::Busy => write!(f, "Backlight already in requested state"),
            Self::Resource(e) => write!(f, "Resource error: {e}"),
            Self::NotSupported => write!(f, "Panel capability not supported"),
            Self::InvalidIndex { index, max } => {
                write!(f, "Index {index} out of range (max {max})")
            }
            Self::FlowFull => write!(f, "Flow step list is full"),
            Self::PanelMismatch => write!(f, "Panel does not match configured driver"),
            Self::InvalidLayer => write!(f, "Invalid framebuffer layer"),
            Self::Bus => write!(f, "Panel link error"),
        }
    }
}

impl core::error::Error for LcdError {}

impl embedded_hal::digital::Error for LcdError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_resource_error_converts_into_lcd_error() {
        let err: LcdError = ResourceError::Io.into();
        assert_eq!(err, LcdError::Resource(ResourceError::Io));
    }

    #[test]
    fn test_invalid_index_display() {
        let err = LcdError::InvalidIndex { index: 7, max: 6 };
        assert_eq!(err.to_string(), "Index 7 out of range (max 6)");
    }

    #[test]
    fn test_only_not_supported_is_not_supported() {
        assert!(LcdError::NotSupported.is_not_supported());
        assert!(!LcdError::Busy.is_not_supported());
    }
}
