//! KLD2844B SPI panel
//!
//! A 2.8" TFT module with an ST7789-class controller on a 4-wire SPI link.
//! Board GPIO 0 drives the panel reset line and board GPIO 1 the DC line.
//!
//! ## Flows
//!
//! | Open step  | Delay | Close step  | Delay |
//! |------------|-------|-------------|-------|
//! | power on   | 50ms  | backlight off | 50ms |
//! | panel init | 20ms  | panel exit  | 10ms  |
//! | backlight on | 0ms | power off   | 10ms  |
//!
//! The SPI link is only usable between power on and panel exit; transfers
//! outside that window fail with [`LcdError::Bus`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use lcdfb::panels::Kld2844b;
//! use lcdfb::{Board, Registry};
//! # use core::convert::Infallible;
//! # use embedded_hal::spi::{Operation, SpiDevice};
//! # use lcdfb::board::*;
//! # use lcdfb::config::MemoryStore;
//! # use lcdfb::ResourceError;
//! # struct MockSpi;
//! # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
//! # impl SpiDevice for MockSpi {
//! #     fn transaction(&mut self, _: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> { Ok(()) }
//! # }
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
//! # let store = MemoryStore::new();
//! let registry = Registry::init(Arc::new(MockBoard), &store, &mut ());
//! registry.register_panel(Arc::new(Kld2844b::new(MockSpi)));
//!
//! if let Ok(lcd) = registry.get(0) {
//!     let _ = lcd.enable();
//! }
//! ```

use alloc::sync::Arc;
use alloc::vec;

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use log::{info, warn};
use spin::Mutex;

use crate::board::Board;
use crate::color::PixelFormat;
use crate::command::{
    COLMOD_RGB565, COLMOD_RGB666, COLUMN_ADDRESS_SET, DISPLAY_OFF, DISPLAY_ON, FRAME_RATE_CONTROL,
    GATE_CONTROL, INTERFACE_PIXEL_FORMAT, LCM_CONTROL, MADCTL_BGR, MADCTL_MV, MADCTL_MX,
    MADCTL_MY, MEMORY_ACCESS_CONTROL, MEMORY_WRITE, NEGATIVE_GAMMA, PORCH_CONTROL,
    POSITIVE_GAMMA, POWER_CONTROL_1, RAM_CONTROL, ROW_ADDRESS_SET, SLEEP_IN, SLEEP_OUT,
    VCOM_SETTING, VDV_SET, VDV_VRH_ENABLE, VRH_SET,
};
use crate::config::PanelInfo;
use crate::error::LcdError;
use crate::gamma::PanelExtendInfo;
use crate::interface::{Interface, InterfaceError, PanelInterface};
use crate::lcd::Lcd;
use crate::panel::{Panel, VarScreenInfo};
use crate::pin::LcdPin;

/// Driver name matched against `lcd_driver_name`
pub const NAME: &str = "kld2844b";

/// Board GPIO index of the reset line
pub const GPIO_RESET: usize = 0;

/// Board GPIO index of the data/command line
pub const GPIO_DC: usize = 1;

const POSITIVE_GAMMA_TABLE: [u8; 14] = [
    0xD0, 0x01, 0x04, 0x09, 0x0B, 0x07, 0x2E, 0x44, 0x43, 0x0B, 0x16, 0x15, 0x17, 0x1D,
];

const NEGATIVE_GAMMA_TABLE: [u8; 14] = [
    0xD0, 0x01, 0x05, 0x0A, 0x0B, 0x08, 0x2F, 0x44, 0x41, 0x0A, 0x15, 0x14, 0x19, 0x1D,
];

type LinkError<SPI> = InterfaceError<<SPI as embedded_hal::spi::ErrorType>::Error, LcdError>;

struct Link<SPI> {
    spi: SPI,
    ready: bool,
}

/// KLD2844B panel plugin
///
/// Cloning shares the same SPI link.
pub struct Kld2844b<SPI> {
    link: Arc<Mutex<Link<SPI>>>,
}

impl<SPI> Clone for Kld2844b<SPI> {
    fn clone(&self) -> Self {
        Self {
            link: self.link.clone(),
        }
    }
}

impl<SPI> Kld2844b<SPI>
where
    SPI: SpiDevice + Send + 'static,
{
    /// Create the plugin around the panel's SPI device
    pub fn new(spi: SPI) -> Self {
        Self {
            link: Arc::new(Mutex::new(Link { spi, ready: false })),
        }
    }

    /// Whether the SPI link is up
    pub fn is_ready(&self) -> bool {
        self.link.lock().ready
    }

    fn with_link<B, R, F>(&self, lcd: &Lcd<B>, op: F) -> Result<R, LcdError>
    where
        B: Board,
        F: FnOnce(&mut Interface<&mut SPI, LcdPin<'_, B>>) -> Result<R, LinkError<SPI>>,
    {
        let mut link = self.link.lock();
        if !link.ready {
            return Err(LcdError::Bus);
        }
        let mut interface = Interface::new(&mut link.spi, lcd.pin(GPIO_DC));
        op(&mut interface).map_err(|e| {
            warn!("{}: {NAME} link: {e}", lcd.name());
            LcdError::Bus
        })
    }

    fn set_reset<B: Board>(lcd: &Lcd<B>, high: bool) {
        let mut pin = lcd.pin(GPIO_RESET);
        let result = if high { pin.set_high() } else { pin.set_low() };
        if let Err(e) = result {
            warn!("{}: {NAME} reset: {e}", lcd.name());
        }
    }

    fn power_on<B: Board>(&self, lcd: &Lcd<B>) {
        if let Err(e) = lcd.power_enable(0) {
            warn!("{}: {NAME} power on: {e}", lcd.name());
        }
        self.link.lock().ready = true;
        info!("{}: {NAME} link up", lcd.name());

        if let Err(e) = lcd.pin_cfg(true) {
            warn!("{}: {NAME} pin config: {e}", lcd.name());
        }
        Self::set_reset(lcd, true);
        lcd.delay_ms(100);
        Self::set_reset(lcd, false);
        lcd.delay_ms(100);
        Self::set_reset(lcd, true);
    }

    fn power_off<B: Board>(lcd: &Lcd<B>) {
        if let Err(e) = lcd.power_disable(0) {
            warn!("{}: {NAME} power off: {e}", lcd.name());
        }
    }

    fn bl_open<B: Board>(lcd: &Lcd<B>) {
        if let Err(e) = lcd.pwm_enable() {
            warn!("{}: {NAME} pwm enable: {e}", lcd.name());
        }
        if let Err(e) = lcd.backlight_enable() {
            warn!("{}: {NAME} backlight enable: {e}", lcd.name());
        }
    }

    fn bl_close<B: Board>(lcd: &Lcd<B>) {
        if let Err(e) = lcd.backlight_disable() {
            warn!("{}: {NAME} backlight disable: {e}", lcd.name());
        }
        if let Err(e) = lcd.pwm_disable() {
            warn!("{}: {NAME} pwm disable: {e}", lcd.name());
        }
    }

    /// The link lock is released across every wait.
    fn panel_init<B: Board>(&self, lcd: &Lcd<B>) {
        let info = lcd.panel_info();

        lcd.delay_ms(120);
        let result = self
            .with_link(lcd, |interface| interface.send_command(SLEEP_OUT))
            .and_then(|()| {
                lcd.delay_ms(200);
                self.with_link(lcd, |interface| init_registers(interface, info))
            })
            .and_then(|()| {
                lcd.delay_ms(200);
                self.with_link(lcd, |interface| interface.send_command(DISPLAY_ON))
            })
            .and_then(|()| self.black_screen(lcd));
        if let Err(e) = result {
            warn!("{}: {NAME} init: {e}", lcd.name());
        }
    }

    fn panel_exit<B: Board>(&self, lcd: &Lcd<B>) {
        let result = self
            .with_link(lcd, |interface| interface.send_command(DISPLAY_OFF))
            .and_then(|()| {
                lcd.delay_ms(20);
                self.with_link(lcd, |interface| interface.send_command(SLEEP_IN))
            });
        lcd.delay_ms(20);
        if let Err(e) = result {
            warn!("{}: {NAME} exit: {e}", lcd.name());
        }

        Self::set_reset(lcd, false);
        lcd.delay_ms(10);
        if let Err(e) = lcd.pin_cfg(false) {
            warn!("{}: {NAME} pin config: {e}", lcd.name());
        }

        self.link.lock().ready = false;
        info!("{}: {NAME} link down", lcd.name());
    }

    fn black_screen<B: Board>(&self, lcd: &Lcd<B>) -> Result<(), LcdError> {
        let info = lcd.panel_info();
        let line = vec![0u8; info.lcd_x as usize * info.lcd_pixel_fmt.wire_bytes_per_pixel()];
        self.with_link(lcd, |interface| {
            interface.send_command(MEMORY_WRITE)?;
            for _ in 0..info.lcd_y {
                interface.send_burst(&line)?;
            }
            Ok(())
        })
    }
}

fn address<I: PanelInterface>(
    interface: &mut I,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
) -> Result<(), I::Error> {
    interface.send_command_with(ROW_ADDRESS_SET, &window(y, height))?;
    interface.send_command_with(COLUMN_ADDRESS_SET, &window(x, width))
}

/// Start and end as big endian 16-bit pairs
fn window(start: u32, end: u32) -> [u8; 4] {
    [(start >> 8) as u8, start as u8, (end >> 8) as u8, end as u8]
}

/// Controller setup between sleep out and display on
fn init_registers<I: PanelInterface>(interface: &mut I, info: &PanelInfo) -> Result<(), I::Error> {
    interface.send_command_with(PORCH_CONTROL, &[0x0C, 0x0C, 0x00, 0x33, 0x33])?;
    interface.send_command_with(GATE_CONTROL, &[0x75])?;

    let mut madctl = if info.lcd_x > info.lcd_y {
        MADCTL_MY | MADCTL_MV
    } else {
        MADCTL_MY | MADCTL_MX
    };

    interface.send_command(INTERFACE_PIXEL_FORMAT)?;
    if info.lcd_pixel_fmt.is_rgb565() {
        interface.send_register(COLMOD_RGB565)?;
        if info.lcd_pixel_fmt == PixelFormat::Rgb565 {
            madctl &= !MADCTL_BGR;
        } else {
            madctl |= MADCTL_BGR;
        }
        // little endian 16-bit pixels
        interface.send_command_with(RAM_CONTROL, &[0x03, 0xC8])?;
    } else {
        madctl |= MADCTL_BGR;
        interface.send_register(COLMOD_RGB666)?;
    }
    interface.send_command_with(MEMORY_ACCESS_CONTROL, &[madctl])?;

    interface.send_command_with(VCOM_SETTING, &[0x2B])?;
    interface.send_command_with(LCM_CONTROL, &[0x2C])?;
    interface.send_command_with(VDV_VRH_ENABLE, &[0x01])?;
    interface.send_command_with(VRH_SET, &[0x0B])?;
    interface.send_command_with(VDV_SET, &[0x20])?;
    interface.send_command_with(FRAME_RATE_CONTROL, &[0x0F])?;
    interface.send_command_with(POWER_CONTROL_1, &[0xA4, 0xA1])?;
    interface.send_command_with(POSITIVE_GAMMA, &POSITIVE_GAMMA_TABLE)?;
    interface.send_command_with(NEGATIVE_GAMMA, &NEGATIVE_GAMMA_TABLE)?;

    address(
        interface,
        0,
        0,
        info.lcd_x.saturating_sub(1),
        info.lcd_y.saturating_sub(1),
    )
}

impl<B, SPI> Panel<B> for Kld2844b<SPI>
where
    B: Board,
    SPI: SpiDevice + Send + 'static,
{
    fn name(&self) -> &str {
        NAME
    }

    fn cfg_panel_info(&self, _info: &mut PanelExtendInfo) -> Result<(), LcdError> {
        Ok(())
    }

    fn cfg_open_flow(&self, lcd: &Lcd<B>) -> Result<(), LcdError> {
        let panel = self.clone();
        lcd.set_open_func(move |lcd| panel.power_on(lcd), 50)?;
        let panel = self.clone();
        lcd.set_open_func(move |lcd| panel.panel_init(lcd), 20)?;
        lcd.set_open_func(Self::bl_open::<B>, 0)
    }

    fn cfg_close_flow(&self, lcd: &Lcd<B>) -> Result<(), LcdError> {
        lcd.set_close_func(Self::bl_close::<B>, 50)?;
        let panel = self.clone();
        lcd.set_close_func(move |lcd| panel.panel_exit(lcd), 10)?;
        lcd.set_close_func(Self::power_off::<B>, 10)
    }

    fn user_defined_func(
        &self,
        _lcd: &Lcd<B>,
        _para1: u32,
        _para2: u32,
        _para3: u32,
    ) -> Result<i32, LcdError> {
        Ok(0)
    }

    fn set_layer(&self, lcd: &Lcd<B>, data: &[u8]) -> Result<(), LcdError> {
        self.with_link(lcd, |interface| interface.send_burst(data))
    }

    fn blank(&self, lcd: &Lcd<B>, enable: bool) -> Result<(), LcdError> {
        let command = if enable { DISPLAY_OFF } else { DISPLAY_ON };
        self.with_link(lcd, |interface| interface.send_command(command))
    }

    fn set_var(&self, _lcd: &Lcd<B>, _var: &VarScreenInfo) -> Result<(), LcdError> {
        Ok(())
    }

    fn set_addr_win(
        &self,
        lcd: &Lcd<B>,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<(), LcdError> {
        self.with_link(lcd, |interface| address(interface, x, y, width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::GpioConfig;
    use crate::config::MemoryStore;
    use crate::mock::{Event, MockBoard, MockSpi};
    use alloc::string::ToString;
    use alloc::vec::Vec;

    fn setup(x: u32, y: u32, format: u32) -> (Lcd<MockBoard>, MockBoard, MockSpi, Kld2844b<MockSpi>) {
        let store = MemoryStore::new()
            .with_u32("lcd_fb0", "lcd_used", 1)
            .with_str("lcd_fb0", "lcd_driver_name", NAME)
            .with_u32("lcd_fb0", "lcd_x", x)
            .with_u32("lcd_fb0", "lcd_y", y)
            .with_u32("lcd_fb0", "lcd_pixel_fmt", format)
            .with_u32("lcd_fb0", "lcd_pwm_used", 1)
            .with_u32("lcd_fb0", "lcd_pwm_freq", 1000)
            .with_str("lcd_fb0", "lcd_power", "vcc-lcd")
            .with_gpio("lcd_fb0", "lcd_gpio_0", GpioConfig::new(10, 1, 1))
            .with_gpio("lcd_fb0", "lcd_gpio_1", GpioConfig::new(11, 1, 0));
        let board = MockBoard::new();
        let lcd = Lcd::from_store(0, Arc::new(board.clone()), &store);
        let spi = MockSpi::default();
        let panel = Kld2844b::new(spi.clone());
        lcd.set_panel_func(NAME, Arc::new(panel.clone())).unwrap();
        board.clear();
        (lcd, board, spi, panel)
    }

    fn push(expected: &mut Vec<Vec<u8>>, command: u8, params: &[u8]) {
        expected.push(vec![command]);
        for &p in params {
            expected.push(vec![p]);
        }
    }

    #[test]
    fn test_init_sequence_rgb565_landscape() {
        let (lcd, _, spi, panel) = setup(4, 2, 0x0a);
        lcd.enable().unwrap();
        assert!(panel.is_ready());

        let mut expected = Vec::new();
        push(&mut expected, 0x11, &[]);
        push(&mut expected, 0xB2, &[0x0C, 0x0C, 0x00, 0x33, 0x33]);
        push(&mut expected, 0xB7, &[0x75]);
        push(&mut expected, 0x3A, &[0x55]);
        push(&mut expected, 0xB0, &[0x03, 0xC8]);
        push(&mut expected, 0x36, &[0xA0]);
        push(&mut expected, 0xBB, &[0x2B]);
        push(&mut expected, 0xC0, &[0x2C]);
        push(&mut expected, 0xC2, &[0x01]);
        push(&mut expected, 0xC3, &[0x0B]);
        push(&mut expected, 0xC4, &[0x20]);
        push(&mut expected, 0xC6, &[0x0F]);
        push(&mut expected, 0xD0, &[0xA4, 0xA1]);
        push(&mut expected, 0xE0, &POSITIVE_GAMMA_TABLE);
        push(&mut expected, 0xE1, &NEGATIVE_GAMMA_TABLE);
        push(&mut expected, 0x2B, &[0, 0, 0, 1]);
        push(&mut expected, 0x2A, &[0, 0, 0, 3]);
        push(&mut expected, 0x29, &[]);
        push(&mut expected, 0x2C, &[]);
        expected.push(vec![0; 8]);
        expected.push(vec![0; 8]);

        assert_eq!(spi.writes(), expected);
    }

    #[test]
    fn test_madctl_portrait_24bit() {
        let (lcd, _, spi, _) = setup(2, 4, 0x00);
        lcd.enable().unwrap();
        let writes = spi.writes();
        let pos = writes.iter().position(|w| *w == [0x3Au8]).unwrap();
        assert_eq!(writes[pos + 1], [0x66u8]);
        assert_eq!(writes[pos + 2], [0x36u8]);
        assert_eq!(writes[pos + 3], [0xC8u8]);
        // black screen lines are 2 pixels of 3 bytes
        assert_eq!(writes.last().unwrap().len(), 6);
    }

    #[test]
    fn test_madctl_bgr565() {
        let (lcd, _, spi, _) = setup(2, 4, 0x0b);
        lcd.enable().unwrap();
        let writes = spi.writes();
        let pos = writes.iter().position(|w| *w == [0x36u8]).unwrap();
        assert_eq!(writes[pos + 1], [0xC8u8]);
    }

    #[test]
    fn test_open_flow_board_activity() {
        let (lcd, board, _, _) = setup(4, 2, 0x0a);
        lcd.enable().unwrap();
        let events = board.events();

        let delays: Vec<u32> = events
            .iter()
            .filter_map(|e| match e {
                Event::Delay(ms) => Some(*ms),
                _ => None,
            })
            .collect();
        assert_eq!(delays, [100, 100, 50, 120, 200, 200, 20]);

        let resets: Vec<bool> = events
            .iter()
            .filter_map(|e| match e {
                Event::GpioSet(10, level) => Some(*level),
                _ => None,
            })
            .collect();
        assert_eq!(resets, [true, false, true]);

        assert!(events.contains(&Event::PowerOn("vcc-lcd".to_string())));
        assert!(events.contains(&Event::PwmEnable));
        assert!(lcd.is_backlight_enabled());
    }

    #[test]
    fn test_link_unlocked_during_waits() {
        let (lcd, board, _, panel) = setup(4, 2, 0x0a);
        let free = Arc::new(Mutex::new(Vec::new()));
        let (seen, link) = (free.clone(), panel.clone());
        board.on_delay(move || seen.lock().push(link.link.try_lock().is_some()));

        lcd.enable().unwrap();
        lcd.disable().unwrap();
        let free = free.lock();
        assert!(free.len() >= 7);
        assert!(free.iter().all(|&unlocked| unlocked));
    }

    #[test]
    fn test_close_flow_releases_link() {
        let (lcd, board, spi, panel) = setup(4, 2, 0x0a);
        lcd.enable().unwrap();
        spi.clear();
        board.clear();

        lcd.disable().unwrap();
        assert!(!panel.is_ready());
        assert_eq!(spi.writes(), [vec![0x28u8], vec![0x10]]);

        let events = board.events();
        assert!(events.contains(&Event::PwmDisable));
        assert!(events.contains(&Event::GpioSet(10, false)));
        assert!(events.contains(&Event::PowerOff("vcc-lcd".to_string())));
        assert!(!lcd.is_backlight_enabled());

        assert_eq!(lcd.blank(true), Err(LcdError::Bus));
    }

    #[test]
    fn test_blank_and_addr_win() {
        let (lcd, _, spi, _) = setup(4, 2, 0x0a);
        lcd.enable().unwrap();
        spi.clear();

        lcd.blank(true).unwrap();
        lcd.blank(false).unwrap();
        lcd.set_addr_win(1, 2, 0x123, 0x145).unwrap();
        assert_eq!(
            spi.writes(),
            [
                vec![0x28u8],
                vec![0x29],
                vec![0x2B],
                vec![0x00],
                vec![0x02],
                vec![0x01],
                vec![0x45],
                vec![0x2A],
                vec![0x00],
                vec![0x01],
                vec![0x01],
                vec![0x23],
            ]
        );
    }

    #[test]
    fn test_layer_is_single_burst() {
        let (lcd, _, spi, _) = setup(4, 2, 0x0a);
        lcd.enable().unwrap();
        spi.clear();

        let screen = [0xAAu8; 16];
        let fb = crate::panel::FbInfo {
            var: VarScreenInfo {
                xres: 4,
                yres: 2,
                bits_per_pixel: 16,
                ..VarScreenInfo::default()
            },
            line_length: 8,
            screen: &screen,
        };
        lcd.set_layer(&fb).unwrap();
        assert_eq!(spi.writes(), [vec![0xAAu8; 16]]);
    }

    #[test]
    fn test_link_down_before_power_on() {
        let (lcd, _, spi, _) = setup(4, 2, 0x0a);
        assert_eq!(lcd.set_addr_win(0, 0, 1, 1), Err(LcdError::Bus));
        assert_eq!(lcd.user_defined_func(1, 2, 3), Ok(0));
        assert!(spi.writes().is_empty());
    }
}
