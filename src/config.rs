//! Display configuration types and loader
//!
//! Board configuration arrives as named key/value descriptors grouped in one
//! section per display (`lcd_fb0`, `lcd_fb1`, ...). The [`ConfigStore`] trait
//! is the read side of that store; [`MemoryStore`] is an in-memory
//! implementation for hosts that build the descriptors themselves.
//!
//! Two structs are parsed out of a section:
//!
//! - [`PanelInfo`] - panel electrical and timing parameters
//! - [`LcdConfig`] - board wiring (power rails, GPIOs, backlight curve)
//!
//! ## Example
//!
//! ```
//! use lcdfb::config::{section_name, LcdConfig, MemoryStore, PanelInfo};
//!
//! let store = MemoryStore::new()
//!     .with_u32("lcd_fb0", "lcd_used", 1)
//!     .with_u32("lcd_fb0", "lcd_x", 240)
//!     .with_u32("lcd_fb0", "lcd_y", 320)
//!     .with_str("lcd_fb0", "lcd_driver_name", "kld2844b");
//!
//! let cfg = LcdConfig::from_store(&store, 0);
//! assert!(cfg.used);
//! assert_eq!(cfg.driver_name.as_deref(), Some("kld2844b"));
//!
//! let info = PanelInfo::from_store(&store, 0);
//! assert_eq!((info.lcd_x, info.lcd_y), (240, 320));
//! assert_eq!(section_name(1), "lcd_fb1");
//! ```

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};

use crate::board::{GpioConfig, Polarity};
use crate::color::PixelFormat;
use crate::curve::CURVE_POINTS;

/// Maximum number of display slots
pub const SUPPORT_MAX_LCD: usize = 2;
/// Number of switchable and fixed power rails per display
pub const LCD_POWER_NUM: usize = 4;
/// Number of board GPIO lines per display
pub const LCD_GPIO_NUM: usize = 6;
/// Number of io-pad regulators per display
pub const LCD_GPIO_REGU_NUM: usize = 3;
/// Largest single SPI burst in bytes
pub const LCD_SPI_MAX_TRANSFER_BYTE: u32 = 100 * 4096;
/// Backlight level used when `lcd_backlight` is not configured
pub const DEFAULT_BACKLIGHT: u32 = 197;

/// Config section name for a display index
pub fn section_name(disp: u32) -> String {
    format!("lcd_fb{disp}")
}

/// Read side of the system config store
pub trait ConfigStore {
    /// Read an integer item
    fn get_u32(&self, section: &str, key: &str) -> Option<u32>;

    /// Read a string item
    fn get_str(&self, section: &str, key: &str) -> Option<&str>;

    /// Read a GPIO descriptor item
    fn get_gpio(&self, section: &str, key: &str) -> Option<GpioConfig>;
}

/// A config item value
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigValue {
    /// Integer item
    U32(u32),
    /// String item
    Str(String),
    /// GPIO descriptor item
    Gpio(GpioConfig),
}

/// In-memory [`ConfigStore`]
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct MemoryStore {
    items: BTreeMap<(String, String), ConfigValue>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an item
    pub fn set(&mut self, section: &str, key: &str, value: ConfigValue) {
        self.items
            .insert((section.to_string(), key.to_string()), value);
    }

    /// Add an integer item
    pub fn with_u32(mut self, section: &str, key: &str, value: u32) -> Self {
        self.set(section, key, ConfigValue::U32(value));
        self
    }

    /// Add a string item
    pub fn with_str(mut self, section: &str, key: &str, value: &str) -> Self {
        self.set(section, key, ConfigValue::Str(value.to_string()));
        self
    }

    /// Add a GPIO descriptor item
    pub fn with_gpio(mut self, section: &str, key: &str, value: GpioConfig) -> Self {
        self.set(section, key, ConfigValue::Gpio(value));
        self
    }

    fn get(&self, section: &str, key: &str) -> Option<&ConfigValue> {
        self.items.get(&(section.to_string(), key.to_string()))
    }
}

impl ConfigStore for MemoryStore {
    fn get_u32(&self, section: &str, key: &str) -> Option<u32> {
        match self.get(section, key) {
            Some(ConfigValue::U32(v)) => Some(*v),
            _ => None,
        }
    }

    fn get_str(&self, section: &str, key: &str) -> Option<&str> {
        match self.get(section, key) {
            Some(ConfigValue::Str(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    fn get_gpio(&self, section: &str, key: &str) -> Option<GpioConfig> {
        match self.get(section, key) {
            Some(ConfigValue::Gpio(v)) => Some(*v),
            _ => None,
        }
    }
}

/// Panel electrical and timing parameters
///
/// Immutable once the display is initialized. Use [`Builder`] or
/// [`PanelInfo::from_store`] to create one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PanelInfo {
    /// Horizontal resolution in pixels
    pub lcd_x: u32,
    /// Vertical resolution in pixels
    pub lcd_y: u32,
    /// Physical width in mm
    pub lcd_width: u32,
    /// Physical height in mm
    pub lcd_height: u32,
    /// Dot clock in kHz
    pub lcd_dclk_freq: u32,
    /// Whether the backlight is PWM driven
    pub lcd_pwm_used: bool,
    /// PWM channel
    pub lcd_pwm_ch: u32,
    /// PWM frequency in Hz
    pub lcd_pwm_freq: u32,
    /// PWM polarity
    pub lcd_pwm_pol: Polarity,
    /// Interface type code
    pub lcd_if: u32,
    /// Framebuffer pixel format
    pub lcd_pixel_fmt: PixelFormat,
    /// Number of framebuffers
    pub fb_buffer_num: u32,
    /// Horizontal back porch including sync width
    pub lcd_hbp: u32,
    /// Horizontal total
    pub lcd_ht: u32,
    /// Vertical back porch including sync width
    pub lcd_vbp: u32,
    /// Vertical total
    pub lcd_vt: u32,
    /// Vertical sync width
    pub lcd_vspw: u32,
    /// Horizontal sync width
    pub lcd_hspw: u32,
    /// Frame rate
    pub lcd_fps: u32,
    /// Frame rate modulation mode
    pub lcd_frm: u32,
    /// Whether red and blue are swapped
    pub lcd_rb_swap: bool,
    /// Whether gamma correction is enabled on the panel
    pub lcd_gamma_en: bool,
    /// Panel model name
    pub lcd_model_name: String,
    /// Lines pushed per SPI burst
    pub lines_per_transfer: u32,
}

impl PanelInfo {
    /// Parse panel parameters from section `lcd_fb<disp>`
    pub fn from_store<C: ConfigStore + ?Sized>(store: &C, disp: u32) -> Self {
        let section = section_name(disp);
        let get = |key: &str| store.get_u32(&section, key);

        let mut builder = Builder::new()
            .resolution(get("lcd_x").unwrap_or(0), get("lcd_y").unwrap_or(0))
            .physical_size(
                get("lcd_width").unwrap_or(0),
                get("lcd_height").unwrap_or(0),
            )
            .dclk_freq(get("lcd_dclk_freq").unwrap_or(0))
            .interface(get("lcd_if").unwrap_or(0))
            .pixel_format(
                get("lcd_pixel_fmt")
                    .and_then(PixelFormat::from_code)
                    .unwrap_or_default(),
            )
            .horizontal(
                get("lcd_ht").unwrap_or(0),
                get("lcd_hbp").unwrap_or(0),
                get("lcd_hspw").unwrap_or(0),
            )
            .vertical(
                get("lcd_vt").unwrap_or(0),
                get("lcd_vbp").unwrap_or(0),
                get("lcd_vspw").unwrap_or(0),
            )
            .frm(get("lcd_frm").unwrap_or(0))
            .rb_swap(get("lcd_rb_swap").unwrap_or(0) != 0)
            .gamma_en(get("lcd_gamma_en").unwrap_or(0) != 0);

        if let Some(num) = get("fb_buffer_num") {
            builder = builder.fb_buffer_num(num);
        }
        if let Some(fps) = get("lcd_fps") {
            builder = builder.fps(fps);
        }
        if get("lcd_pwm_used").unwrap_or(0) != 0 {
            builder = builder.pwm(
                get("lcd_pwm_ch").unwrap_or(0),
                get("lcd_pwm_freq").unwrap_or(0),
                Polarity::from_config(get("lcd_pwm_pol").unwrap_or(0)),
            );
        }
        if let Some(name) = store.get_str(&section, "lcd_model_name") {
            builder = builder.model_name(name);
        }

        builder.build()
    }

    /// Horizontal and vertical resolution
    pub fn resolution(&self) -> (u32, u32) {
        (self.lcd_x, self.lcd_y)
    }
}

/// Compute how many lines fit a single SPI burst
///
/// Starts from the largest line count under [`LCD_SPI_MAX_TRANSFER_BYTE`] and
/// steps down until it divides the panel height evenly.
pub fn lines_per_transfer(lcd_x: u32, lcd_y: u32, format: PixelFormat) -> u32 {
    let line_bytes = lcd_x.checked_mul(format.wire_bytes_per_pixel() as u32);
    let Some(line_bytes) = line_bytes.filter(|&n| n != 0) else {
        return 1;
    };
    let mut lines = LCD_SPI_MAX_TRANSFER_BYTE / line_bytes;
    while lines > 1 {
        if lcd_y % lines == 0 {
            break;
        }
        lines -= 1;
    }
    lines.max(1)
}

/// Builder for [`PanelInfo`]
///
/// # Example
///
/// ```
/// use lcdfb::config::Builder;
/// use lcdfb::color::PixelFormat;
///
/// let info = Builder::new()
///     .resolution(240, 320)
///     .pixel_format(PixelFormat::Rgb565)
///     .build();
/// assert_eq!(info.lcd_fps, 25);
/// assert_eq!(info.lines_per_transfer, 320);
/// ```
#[must_use]
pub struct Builder {
    info: PanelInfo,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            info: PanelInfo {
                fb_buffer_num: 2,
                lcd_fps: 25,
                lines_per_transfer: 1,
                ..PanelInfo::default()
            },
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set resolution in pixels
    pub fn resolution(mut self, x: u32, y: u32) -> Self {
        self.info.lcd_x = x;
        self.info.lcd_y = y;
        self
    }

    /// Set physical size in mm
    pub fn physical_size(mut self, width: u32, height: u32) -> Self {
        self.info.lcd_width = width;
        self.info.lcd_height = height;
        self
    }

    /// Set dot clock in kHz
    pub fn dclk_freq(mut self, khz: u32) -> Self {
        self.info.lcd_dclk_freq = khz;
        self
    }

    /// Enable PWM backlight on a channel
    pub fn pwm(mut self, channel: u32, freq_hz: u32, polarity: Polarity) -> Self {
        self.info.lcd_pwm_used = true;
        self.info.lcd_pwm_ch = channel;
        self.info.lcd_pwm_freq = freq_hz;
        self.info.lcd_pwm_pol = polarity;
        self
    }

    /// Set interface type code
    pub fn interface(mut self, lcd_if: u32) -> Self {
        self.info.lcd_if = lcd_if;
        self
    }

    /// Set framebuffer pixel format
    pub fn pixel_format(mut self, format: PixelFormat) -> Self {
        self.info.lcd_pixel_fmt = format;
        self
    }

    /// Set number of framebuffers
    pub fn fb_buffer_num(mut self, num: u32) -> Self {
        self.info.fb_buffer_num = num;
        self
    }

    /// Set horizontal total, back porch and sync width
    pub fn horizontal(mut self, total: u32, back_porch: u32, sync: u32) -> Self {
        self.info.lcd_ht = total;
        self.info.lcd_hbp = back_porch;
        self.info.lcd_hspw = sync;
        self
    }

    /// Set vertical total, back porch and sync width
    pub fn vertical(mut self, total: u32, back_porch: u32, sync: u32) -> Self {
        self.info.lcd_vt = total;
        self.info.lcd_vbp = back_porch;
        self.info.lcd_vspw = sync;
        self
    }

    /// Set frame rate
    pub fn fps(mut self, fps: u32) -> Self {
        self.info.lcd_fps = fps;
        self
    }

    /// Set frame rate modulation mode
    pub fn frm(mut self, frm: u32) -> Self {
        self.info.lcd_frm = frm;
        self
    }

    /// Set red/blue swap
    pub fn rb_swap(mut self, swap: bool) -> Self {
        self.info.lcd_rb_swap = swap;
        self
    }

    /// Set panel gamma enable
    pub fn gamma_en(mut self, enable: bool) -> Self {
        self.info.lcd_gamma_en = enable;
        self
    }

    /// Set panel model name
    pub fn model_name(mut self, name: &str) -> Self {
        self.info.lcd_model_name = name.to_string();
        self
    }

    /// Build the panel parameters
    pub fn build(mut self) -> PanelInfo {
        self.info.lines_per_transfer = lines_per_transfer(
            self.info.lcd_x,
            self.info.lcd_y,
            self.info.lcd_pixel_fmt,
        );
        self.info
    }
}

/// Negotiated video timings derived from [`PanelInfo`]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VideoTimings {
    /// Pixel clock in Hz
    pub pixel_clk: u32,
    /// Horizontal resolution
    pub x_res: u32,
    /// Vertical resolution
    pub y_res: u32,
    /// Horizontal total
    pub hor_total_time: u32,
    /// Horizontal sync width
    pub hor_sync_time: u32,
    /// Horizontal back porch
    pub hor_back_porch: u32,
    /// Horizontal front porch
    pub hor_front_porch: u32,
    /// Vertical total
    pub ver_total_time: u32,
    /// Vertical sync width
    pub ver_sync_time: u32,
    /// Vertical back porch
    pub ver_back_porch: u32,
    /// Vertical front porch
    pub ver_front_porch: u32,
}

impl VideoTimings {
    /// Derive timings from panel parameters
    pub fn from_panel(info: &PanelInfo) -> Self {
        Self {
            pixel_clk: info.lcd_dclk_freq.saturating_mul(1000),
            x_res: info.lcd_x,
            y_res: info.lcd_y,
            hor_total_time: info.lcd_ht,
            hor_sync_time: info.lcd_hspw,
            hor_back_porch: info.lcd_hbp.saturating_sub(info.lcd_hspw),
            hor_front_porch: info
                .lcd_ht
                .saturating_sub(info.lcd_hbp)
                .saturating_sub(info.lcd_x),
            ver_total_time: info.lcd_vt,
            ver_sync_time: info.lcd_vspw,
            ver_back_porch: info.lcd_vbp.saturating_sub(info.lcd_vspw),
            ver_front_porch: info
                .lcd_vt
                .saturating_sub(info.lcd_vbp)
                .saturating_sub(info.lcd_y),
        }
    }
}

/// Board wiring for one display
#[derive(Clone, Debug, PartialEq)]
pub struct LcdConfig {
    /// Whether the slot is in use
    pub used: bool,
    /// Name of the panel driver that serves this display
    pub driver_name: Option<String>,
    /// Backlight enable GPIO
    pub bl_en: Option<GpioConfig>,
    /// io-pad rail for the backlight enable GPIO
    pub bl_en_power: Option<String>,
    /// Rails enabled unconditionally around every enable/disable
    pub fix_power: [Option<String>; LCD_POWER_NUM],
    /// Rails switched by panel flow steps
    pub power: [Option<String>; LCD_POWER_NUM],
    /// Panel GPIO lines
    pub gpio: [Option<GpioConfig>; LCD_GPIO_NUM],
    /// io-pad rails for the panel GPIO lines
    pub gpio_power: [Option<String>; LCD_GPIO_REGU_NUM],
    /// io-pad rails for the display pin group
    pub pin_power: [Option<String>; LCD_GPIO_REGU_NUM],
    /// Backlight curve control points scaled to 0..=255
    pub backlight_curve_adjust: [u8; CURVE_POINTS],
    /// Initial backlight brightness
    pub backlight_bright: u32,
}

impl Default for LcdConfig {
    fn default() -> Self {
        let mut backlight_curve_adjust = [0u8; CURVE_POINTS];
        backlight_curve_adjust[CURVE_POINTS - 1] = 255;
        Self {
            used: false,
            driver_name: None,
            bl_en: None,
            bl_en_power: None,
            fix_power: Default::default(),
            power: Default::default(),
            gpio: [None; LCD_GPIO_NUM],
            gpio_power: Default::default(),
            pin_power: Default::default(),
            backlight_curve_adjust,
            backlight_bright: 0,
        }
    }
}

impl LcdConfig {
    /// Parse board wiring from section `lcd_fb<disp>`
    ///
    /// Stops after `lcd_used` when the slot is unused.
    pub fn from_store<C: ConfigStore + ?Sized>(store: &C, disp: u32) -> Self {
        let section = section_name(disp);
        let mut cfg = Self {
            used: store.get_u32(&section, "lcd_used").unwrap_or(0) == 1,
            ..Self::default()
        };
        if !cfg.used {
            return cfg;
        }

        cfg.driver_name = store
            .get_str(&section, "lcd_driver_name")
            .map(ToString::to_string);
        cfg.bl_en = store.get_gpio(&section, "lcd_bl_en");
        cfg.bl_en_power = rail(store, &section, "lcd_bl_en_power");

        for i in 0..LCD_POWER_NUM {
            cfg.fix_power[i] = rail(store, &section, &indexed_key("lcd_fix_power", i));
            cfg.power[i] = rail(store, &section, &indexed_key("lcd_power", i));
        }
        for (i, gpio) in cfg.gpio.iter_mut().enumerate() {
            *gpio = store.get_gpio(&section, &format!("lcd_gpio_{i}"));
        }
        for i in 0..LCD_GPIO_REGU_NUM {
            cfg.gpio_power[i] = rail(store, &section, &format!("lcd_gpio_power{i}"));
            cfg.pin_power[i] = rail(store, &section, &indexed_key("lcd_pin_power", i));
        }

        if store.get_u32(&section, "lcd_pwm_used") == Some(1) {
            for (i, point) in cfg.backlight_curve_adjust.iter_mut().enumerate() {
                if let Some(percent) = store.get_u32(&section, &format!("lcd_bl_{i}_percent")) {
                    *point = (percent.min(100) * 255 / 100) as u8;
                }
            }
            cfg.backlight_bright = store
                .get_u32(&section, "lcd_backlight")
                .map_or(DEFAULT_BACKLIGHT, |v| v.min(256));
        }

        cfg
    }
}

/// `base` for index 0, `base<i>` otherwise
fn indexed_key(base: &str, i: usize) -> String {
    if i == 0 {
        base.to_string()
    } else {
        format!("{base}{i}")
    }
}

/// Rail names `""` and `"none"` mean the rail is not wired
fn rail<C: ConfigStore + ?Sized>(store: &C, section: &str, key: &str) -> Option<String> {
    store
        .get_str(section, key)
        .filter(|name| !name.is_empty() && *name != "none")
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unused_slot_stops_parsing() {
        let store = MemoryStore::new()
            .with_u32("lcd_fb0", "lcd_used", 0)
            .with_str("lcd_fb0", "lcd_power", "vcc-lcd");
        let cfg = LcdConfig::from_store(&store, 0);
        assert!(!cfg.used);
        assert_eq!(cfg.power[0], None);
    }

    #[test]
    fn test_rail_names_and_none() {
        let store = MemoryStore::new()
            .with_u32("lcd_fb0", "lcd_used", 1)
            .with_str("lcd_fb0", "lcd_fix_power", "vcc-io")
            .with_str("lcd_fb0", "lcd_fix_power2", "none")
            .with_str("lcd_fb0", "lcd_power1", "vcc-lcd")
            .with_str("lcd_fb0", "lcd_pin_power", "")
            .with_str("lcd_fb0", "lcd_gpio_power1", "vcc-pd");
        let cfg = LcdConfig::from_store(&store, 0);
        assert_eq!(cfg.fix_power[0].as_deref(), Some("vcc-io"));
        assert_eq!(cfg.fix_power[2], None);
        assert_eq!(cfg.power[1].as_deref(), Some("vcc-lcd"));
        assert_eq!(cfg.pin_power[0], None);
        assert_eq!(cfg.gpio_power[1].as_deref(), Some("vcc-pd"));
    }

    #[test]
    fn test_gpio_table() {
        let store = MemoryStore::new()
            .with_u32("lcd_fb0", "lcd_used", 1)
            .with_gpio("lcd_fb0", "lcd_gpio_0", GpioConfig::new(10, 1, 1))
            .with_gpio("lcd_fb0", "lcd_gpio_3", GpioConfig::new(13, 1, 0));
        let cfg = LcdConfig::from_store(&store, 0);
        assert_eq!(cfg.gpio[0], Some(GpioConfig::new(10, 1, 1)));
        assert_eq!(cfg.gpio[1], None);
        assert_eq!(cfg.gpio[3], Some(GpioConfig::new(13, 1, 0)));
    }

    #[test]
    fn test_backlight_curve_scaled_from_percent() {
        let store = MemoryStore::new()
            .with_u32("lcd_fb0", "lcd_used", 1)
            .with_u32("lcd_fb0", "lcd_pwm_used", 1)
            .with_u32("lcd_fb0", "lcd_bl_50_percent", 50)
            .with_u32("lcd_fb0", "lcd_bl_80_percent", 150);
        let cfg = LcdConfig::from_store(&store, 0);
        assert_eq!(cfg.backlight_curve_adjust[50], 127);
        assert_eq!(cfg.backlight_curve_adjust[80], 255);
        assert_eq!(cfg.backlight_curve_adjust[100], 255);
        assert_eq!(cfg.backlight_bright, DEFAULT_BACKLIGHT);
    }

    #[test]
    fn test_backlight_clamped_to_256() {
        let store = MemoryStore::new()
            .with_u32("lcd_fb0", "lcd_used", 1)
            .with_u32("lcd_fb0", "lcd_pwm_used", 1)
            .with_u32("lcd_fb0", "lcd_backlight", 400);
        assert_eq!(LcdConfig::from_store(&store, 0).backlight_bright, 256);
    }

    #[test]
    fn test_backlight_zero_without_pwm() {
        let store = MemoryStore::new().with_u32("lcd_fb0", "lcd_used", 1);
        assert_eq!(LcdConfig::from_store(&store, 0).backlight_bright, 0);
    }

    #[test]
    fn test_panel_defaults() {
        let info = PanelInfo::from_store(&MemoryStore::new(), 0);
        assert_eq!(info.fb_buffer_num, 2);
        assert_eq!(info.lcd_fps, 25);
        assert_eq!(info.lines_per_transfer, 1);
        assert!(!info.lcd_pwm_used);
    }

    #[test]
    fn test_pwm_keys_ignored_when_unused() {
        let store = MemoryStore::new()
            .with_u32("lcd_fb0", "lcd_pwm_ch", 3)
            .with_u32("lcd_fb0", "lcd_pwm_freq", 5000);
        let info = PanelInfo::from_store(&store, 0);
        assert_eq!(info.lcd_pwm_ch, 0);
        assert_eq!(info.lcd_pwm_freq, 0);
    }

    #[test]
    fn test_lines_per_transfer_divides_height() {
        // 409600 / (240 * 3) = 568 lines, largest divisor of 320 below that is 320
        assert_eq!(lines_per_transfer(240, 320, PixelFormat::Argb8888), 320);
        // 409600 / (480 * 3) = 284, largest divisor of 800 below that is 200
        assert_eq!(lines_per_transfer(480, 800, PixelFormat::Rgb888), 200);
        // 409600 / (1000 * 2) = 204, 211 is prime so only 1 divides
        assert_eq!(lines_per_transfer(1000, 211, PixelFormat::Rgb565), 1);
    }

    #[test]
    fn test_lines_per_transfer_zero_width() {
        assert_eq!(lines_per_transfer(0, 320, PixelFormat::Rgb565), 1);
    }

    #[test]
    fn test_lines_per_transfer_huge_width() {
        assert_eq!(lines_per_transfer(u32::MAX, 10, PixelFormat::Rgb888), 1);

        let store = MemoryStore::new()
            .with_u32("lcd_fb0", "lcd_x", u32::MAX)
            .with_u32("lcd_fb0", "lcd_y", 10)
            .with_u32("lcd_fb0", "lcd_pixel_fmt", 0x08);
        assert_eq!(PanelInfo::from_store(&store, 0).lines_per_transfer, 1);
    }

    #[test]
    fn test_video_timings() {
        let info = Builder::new()
            .resolution(240, 320)
            .dclk_freq(6000)
            .horizontal(300, 40, 10)
            .vertical(340, 12, 2)
            .build();
        let t = VideoTimings::from_panel(&info);
        assert_eq!(t.pixel_clk, 6_000_000);
        assert_eq!(t.hor_back_porch, 30);
        assert_eq!(t.hor_front_porch, 20);
        assert_eq!(t.ver_back_porch, 10);
        assert_eq!(t.ver_front_porch, 8);
    }
}
