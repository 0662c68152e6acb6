//! Display slot registry
//!
//! [`Registry::init`] walks the config sections `lcd_fb0..` up to
//! [`SUPPORT_MAX_LCD`], creates an [`Lcd`] for every section marked
//! `lcd_used = 1` and announces it to the host device model. Panel plugins
//! are then matched to displays by driver name.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use lcdfb::config::MemoryStore;
//! use lcdfb::{Board, Registry};
//! # use lcdfb::board::*;
//! # use lcdfb::ResourceError;
//! # struct MockDelay;
//! # impl embedded_hal::delay::DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # struct MockBoard;
//! # impl Board for MockBoard {
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
//! let store = MemoryStore::new().with_u32("lcd_fb0", "lcd_used", 1);
//! let registry = Registry::init(Arc::new(MockBoard), &store, &mut ());
//!
//! if let Ok(lcd) = registry.get(0) {
//!     let _ = lcd.enable();
//! }
//! registry.exit(&mut ());
//! ```

use alloc::sync::Arc;
use alloc::vec::Vec;

use log::{info, warn};

use crate::board::Board;
use crate::config::{section_name, ConfigStore, SUPPORT_MAX_LCD};
use crate::error::{LcdError, ResourceError};
use crate::lcd::Lcd;
use crate::panel::Panel;

/// Host device model a display is announced to
pub trait DeviceHost {
    /// Create the host device for display `disp`
    fn register(&mut self, name: &str, disp: u32) -> Result<(), ResourceError>;

    /// Remove the host device for display `disp`
    fn unregister(&mut self, name: &str, disp: u32);
}

/// Hosts without a device model
impl DeviceHost for () {
    fn register(&mut self, _name: &str, _disp: u32) -> Result<(), ResourceError> {
        Ok(())
    }

    fn unregister(&mut self, _name: &str, _disp: u32) {}
}

/// All configured display slots
pub struct Registry<B: Board> {
    lcds: Vec<Lcd<B>>,
}

impl<B: Board> Registry<B> {
    /// Create a display for every used config section
    ///
    /// A display keeps the index of its config section, so `lcd_fb1` is
    /// always display 1 even when `lcd_fb0` is unused.
    pub fn init<C, H>(board: Arc<B>, store: &C, host: &mut H) -> Self
    where
        C: ConfigStore + ?Sized,
        H: DeviceHost + ?Sized,
    {
        let mut lcds = Vec::new();
        for disp in 0..SUPPORT_MAX_LCD as u32 {
            let section = section_name(disp);
            if store.get_u32(&section, "lcd_used") != Some(1) {
                continue;
            }
            let lcd = Lcd::from_store(disp, board.clone(), store);
            if let Err(e) = host.register(lcd.name(), disp) {
                warn!("{}: host device register failed: {e}", lcd.name());
            }
            info!("{}: registered from {section}", lcd.name());
            lcds.push(lcd);
        }
        Self { lcds }
    }

    /// Display with index `disp`
    pub fn get(&self, disp: u32) -> Result<&Lcd<B>, LcdError> {
        self.lcds.iter().find(|lcd| lcd.disp() == disp).ok_or_else(|| {
            warn!("lcd{disp}: no such display");
            LcdError::InvalidHandle
        })
    }

    /// All registered displays in index order
    pub fn iter(&self) -> impl Iterator<Item = &Lcd<B>> {
        self.lcds.iter()
    }

    /// Number of registered displays
    pub fn len(&self) -> usize {
        self.lcds.len()
    }

    /// Whether no display is configured
    pub fn is_empty(&self) -> bool {
        self.lcds.is_empty()
    }

    /// Bind a panel plugin to every display whose driver name matches
    ///
    /// Returns the number of displays the panel was bound to.
    pub fn register_panel(&self, panel: Arc<dyn Panel<B>>) -> usize {
        let mut bound = 0;
        for lcd in &self.lcds {
            if lcd.set_panel_func(panel.name(), panel.clone()).is_ok() {
                bound += 1;
            }
        }
        if bound == 0 {
            warn!("panel {} matches no display", panel.name());
        }
        bound
    }

    /// Power down every display and remove it from the host
    pub fn exit<H: DeviceHost + ?Sized>(self, host: &mut H) {
        for lcd in self.lcds.iter().rev() {
            if let Err(e) = lcd.disable() {
                warn!("{}: disable on exit failed: {e}", lcd.name());
            }
            host.unregister(lcd.name(), lcd.disp());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryStore;
    use crate::mock::{MockBoard, MockPanel};
    use alloc::string::{String, ToString};

    #[derive(Default)]
    struct RecordingHost {
        registered: Vec<(String, u32)>,
        unregistered: Vec<(String, u32)>,
    }

    impl DeviceHost for RecordingHost {
        fn register(&mut self, name: &str, disp: u32) -> Result<(), ResourceError> {
            self.registered.push((name.to_string(), disp));
            Ok(())
        }

        fn unregister(&mut self, name: &str, disp: u32) {
            self.unregistered.push((name.to_string(), disp));
        }
    }

    fn two_slot_store() -> MemoryStore {
        MemoryStore::new()
            .with_u32("lcd_fb0", "lcd_used", 0)
            .with_u32("lcd_fb1", "lcd_used", 1)
            .with_str("lcd_fb1", "lcd_driver_name", "mock")
            .with_u32("lcd_fb2", "lcd_used", 1)
    }

    #[test]
    fn test_slots_keep_config_index() {
        let mut host = RecordingHost::default();
        let registry = Registry::init(Arc::new(MockBoard::new()), &two_slot_store(), &mut host);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(1).unwrap().name(), "lcd1");
        assert_eq!(host.registered, [("lcd1".to_string(), 1)]);
    }

    #[test]
    fn test_invalid_handle() {
        let registry = Registry::init(Arc::new(MockBoard::new()), &two_slot_store(), &mut ());
        assert!(matches!(registry.get(0), Err(LcdError::InvalidHandle)));
        assert!(matches!(registry.get(5), Err(LcdError::InvalidHandle)));
    }

    #[test]
    fn test_empty_config() {
        let registry = Registry::init(Arc::new(MockBoard::new()), &MemoryStore::new(), &mut ());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_panel_by_driver_name() {
        let registry = Registry::init(Arc::new(MockBoard::new()), &two_slot_store(), &mut ());
        assert_eq!(registry.register_panel(Arc::new(MockPanel::new("other"))), 0);

        let panel = MockPanel::new("mock");
        assert_eq!(registry.register_panel(Arc::new(panel.clone())), 1);
        registry.get(1).unwrap().enable().unwrap();
        assert_eq!(panel.count("open"), 1);
    }

    #[test]
    fn test_exit_disables_and_unregisters() {
        let mut host = RecordingHost::default();
        let registry = Registry::init(Arc::new(MockBoard::new()), &two_slot_store(), &mut host);
        let panel = MockPanel::new("mock");
        registry.register_panel(Arc::new(panel.clone()));
        registry.get(1).unwrap().enable().unwrap();

        registry.exit(&mut host);
        assert_eq!(panel.count("close"), 1);
        assert_eq!(host.unregistered, [("lcd1".to_string(), 1)]);
    }
}
