//! LCD lifecycle engine
//!
//! [`Lcd`] owns the per-display state and drives the enable/disable
//! sequences, backlight PWM, gamma and color adjustment, and framebuffer
//! transfer for one display slot.
//!
//! ## Lifecycle
//!
//! ```text
//! Disabled --enable()--> Enabling --> Enabled --disable()--> Disabling --> Disabled
//! ```
//!
//! `enable()` brings up the fixed rails and board GPIOs, programs the PWM,
//! then runs the open flow registered by the bound panel. `disable()` runs
//! the close flow and tears the board resources down in reverse order.
//!
//! ## Locking
//!
//! Two locks per display:
//!
//! - the status lock guards flags, brightness and gamma state and is only
//!   held for field access, never across a board call, panel callback or
//!   delay
//! - the transfer lock serializes [`Lcd::set_layer`], [`Lcd::set_var`] and
//!   [`Lcd::blank`]
//!
//! Board failures inside a sequence are logged and the sequence continues.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use lcdfb::{Board, Lcd};
//! use lcdfb::config::MemoryStore;
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
//! let store = MemoryStore::new()
//!     .with_u32("lcd_fb0", "lcd_used", 1)
//!     .with_u32("lcd_fb0", "lcd_x", 240)
//!     .with_u32("lcd_fb0", "lcd_y", 320);
//!
//! let lcd = Lcd::from_store(0, Arc::new(MockBoard), &store);
//! let _ = lcd.enable();
//! let _ = lcd.set_bright(128);
//! let _ = lcd.disable();
//! ```

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec;

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};
use spin::Mutex;

use crate::board::{Board, Direction, GpioHandle, PinState, Polarity, PwmHandle};
use crate::color::pack_rgb32_to_rgb24;
use crate::config::{
    section_name, ConfigStore, LcdConfig, PanelInfo, VideoTimings, LCD_GPIO_NUM, LCD_POWER_NUM,
};
use crate::curve::BrightnessCurve;
use crate::error::{LcdError, ResourceError};
use crate::flow::{FlowKind, FlowStep, Flows};
use crate::gamma::{apply_color_adjust, PanelExtendInfo, COLOR_TEMPERATURE_MAX, GAMMA_TABLE_LEN};
use crate::panel::{FbInfo, Panel, VarScreenInfo};
use crate::pin::LcdPin;

/// Default PWM frequency when the board config leaves it at 0
pub const DEFAULT_PWM_FREQ_HZ: u32 = 1000;

/// Full dimming factor
pub const DIMMING_MAX: u32 = 256;

/// Lifecycle state of a display
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LcdStatus {
    /// Powered down
    Disabled,
    /// Enable sequence in progress
    Enabling,
    /// Fully powered up
    Enabled,
    /// Disable sequence in progress
    Disabling,
}

struct LcdState {
    enabled: bool,
    enabling: bool,
    disabling: bool,
    bl_enabled: bool,
    bl_need_enabled: bool,
    power_enabled: u32,
    backlight_bright: u32,
    backlight_dimming: u32,
    pwm_duty_ns: u32,
    pwm_enabled: bool,
    color_temperature: i32,
    color_inverse: bool,
    extend: PanelExtendInfo,
    extend_set: PanelExtendInfo,
    extend_dirty: bool,
    gpio: [Option<GpioHandle>; LCD_GPIO_NUM],
    bl_gpio: Option<GpioHandle>,
}

impl LcdState {
    fn recompute_gamma(&mut self) {
        self.extend_set =
            apply_color_adjust(&self.extend, self.color_temperature, self.color_inverse);
    }

    fn refresh_gamma(&mut self) {
        self.recompute_gamma();
        self.extend_dirty = true;
    }
}

/// One display slot
pub struct Lcd<B: Board> {
    disp: u32,
    name: String,
    board: Arc<B>,
    timings: VideoTimings,
    panel_info: PanelInfo,
    cfg: LcdConfig,
    curve: BrightnessCurve,
    pwm: Option<PwmHandle>,
    pwm_polarity: Polarity,
    pwm_period_ns: u32,
    panel: Mutex<Option<Arc<dyn Panel<B>>>>,
    flows: Mutex<Flows<B>>,
    state: Mutex<LcdState>,
    transfer: Mutex<()>,
}

impl<B: Board> Lcd<B> {
    /// Create the engine for display `disp`
    ///
    /// Requests the backlight PWM channel when the panel uses one and builds
    /// the brightness curve from the board config.
    pub fn new(disp: u32, board: Arc<B>, panel_info: PanelInfo, cfg: LcdConfig) -> Self {
        let name = format!("lcd{disp}");
        let timings = VideoTimings::from_panel(&panel_info);
        let curve = BrightnessCurve::new(&cfg.backlight_curve_adjust);

        let mut pwm = None;
        let mut pwm_period_ns = 0;
        let mut pwm_duty_ns = 0;
        if panel_info.lcd_pwm_used {
            match board.pwm_request(panel_info.lcd_pwm_ch) {
                Ok(handle) => pwm = Some(handle),
                Err(e) => warn!("{name}: pwm channel {} request failed: {e}", panel_info.lcd_pwm_ch),
            }
            let freq = if panel_info.lcd_pwm_freq == 0 {
                warn!("{name}: lcd_pwm_freq is 0, using {DEFAULT_PWM_FREQ_HZ} Hz");
                DEFAULT_PWM_FREQ_HZ
            } else {
                panel_info.lcd_pwm_freq
            };
            pwm_period_ns = 1_000_000_000 / freq;
            pwm_duty_ns = saturate(
                u64::from(cfg.backlight_bright) * u64::from(pwm_period_ns) / 256,
            );
        }

        let state = LcdState {
            enabled: false,
            enabling: false,
            disabling: false,
            bl_enabled: false,
            bl_need_enabled: false,
            power_enabled: 0,
            backlight_bright: cfg.backlight_bright,
            backlight_dimming: DIMMING_MAX,
            pwm_duty_ns,
            pwm_enabled: false,
            color_temperature: 0,
            color_inverse: false,
            extend: PanelExtendInfo::default(),
            extend_set: PanelExtendInfo::default(),
            extend_dirty: false,
            gpio: [None; LCD_GPIO_NUM],
            bl_gpio: None,
        };

        Self {
            disp,
            name,
            board,
            timings,
            pwm_polarity: panel_info.lcd_pwm_pol,
            panel_info,
            cfg,
            curve,
            pwm,
            pwm_period_ns,
            panel: Mutex::new(None),
            flows: Mutex::new(Flows::new()),
            state: Mutex::new(state),
            transfer: Mutex::new(()),
        }
    }

    /// Create the engine from config section `lcd_fb<disp>`
    pub fn from_store<C: ConfigStore + ?Sized>(disp: u32, board: Arc<B>, store: &C) -> Self {
        let panel_info = PanelInfo::from_store(store, disp);
        let cfg = LcdConfig::from_store(store, disp);
        Self::new(disp, board, panel_info, cfg)
    }

    /// Display index
    pub fn disp(&self) -> u32 {
        self.disp
    }

    /// Display name, `lcd<N>`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The board resource controllers
    pub fn board(&self) -> &B {
        &self.board
    }

    /// Negotiated video timings
    pub fn timings(&self) -> &VideoTimings {
        &self.timings
    }

    /// Panel parameters
    pub fn panel_info(&self) -> &PanelInfo {
        &self.panel_info
    }

    /// Board wiring
    pub fn config(&self) -> &LcdConfig {
        &self.cfg
    }

    /// Horizontal and vertical resolution in pixels
    pub fn get_resolution(&self) -> (u32, u32) {
        self.panel_info.resolution()
    }

    /// Physical width and height in mm
    pub fn get_dimensions(&self) -> (u32, u32) {
        (self.panel_info.lcd_width, self.panel_info.lcd_height)
    }

    /// Current lifecycle state
    pub fn status(&self) -> LcdStatus {
        let state = self.state.lock();
        if state.enabled {
            LcdStatus::Enabled
        } else if state.enabling {
            LcdStatus::Enabling
        } else if state.disabling {
            LcdStatus::Disabling
        } else {
            LcdStatus::Disabled
        }
    }

    /// Whether the enable sequence has completed
    pub fn is_enabled(&self) -> bool {
        self.state.lock().enabled
    }

    /// Block the calling thread
    pub fn delay_ms(&self, ms: u32) {
        if ms > 0 {
            self.board.delay().delay_ms(ms);
        }
    }

    /// Board GPIO `index` as an embedded-hal pin
    pub fn pin(&self, index: usize) -> LcdPin<'_, B> {
        LcdPin::new(self, index)
    }

    fn bound_panel(&self) -> Option<Arc<dyn Panel<B>>> {
        self.panel.lock().clone()
    }

    /// Power up the display
    ///
    /// Returns immediately when already enabled. Without a bound panel the
    /// open flow is empty and only board resources are brought up.
    pub fn enable(&self) -> Result<(), LcdError> {
        if self.is_enabled() {
            return Ok(());
        }
        info!("{}: enable", self.name);

        for rail in self.cfg.fix_power.iter().flatten() {
            self.rail_on(rail);
        }

        {
            let mut state = self.state.lock();
            state.enabling = true;
            state.bl_need_enabled = false;
            state.extend.gamma_en = self.panel_info.lcd_gamma_en;
        }
        self.gpio_init();

        if let Some(pwm) = self.pwm {
            let duty = self.state.lock().pwm_duty_ns;
            self.program_pwm(pwm, duty, self.pwm_polarity);
        }

        self.build_flow(FlowKind::Open);
        self.run_flow(FlowKind::Open);

        {
            let mut state = self.state.lock();
            state.enabled = true;
            state.enabling = false;
        }

        let bright = self.get_bright();
        self.set_bright(bright)
    }

    /// Stub kept for the framebuffer layer's boot path, does nothing
    pub fn fake_enable(&self) -> Result<(), LcdError> {
        warn!("{}: fake_enable is not implemented", self.name);
        Ok(())
    }

    /// Power down the display
    ///
    /// Does nothing unless the display is enabled.
    pub fn disable(&self) -> Result<(), LcdError> {
        {
            let mut state = self.state.lock();
            if !state.enabled {
                return Ok(());
            }
            state.enabled = false;
            state.disabling = true;
            state.bl_need_enabled = false;
        }
        info!("{}: disable", self.name);

        self.build_flow(FlowKind::Close);
        self.run_flow(FlowKind::Close);

        self.gpio_exit();
        for rail in self.cfg.fix_power.iter().rev().flatten() {
            self.rail_off(rail);
        }

        self.state.lock().disabling = false;
        Ok(())
    }

    fn rail_on(&self, rail: &str) {
        if let Err(e) = self.board.power_enable(rail) {
            warn!("{}: enable rail {rail} failed: {e}", self.name);
        }
    }

    fn rail_off(&self, rail: &str) {
        if let Err(e) = self.board.power_disable(rail) {
            warn!("{}: disable rail {rail} failed: {e}", self.name);
        }
    }

    fn gpio_init(&self) {
        for rail in self.cfg.gpio_power.iter().flatten() {
            self.rail_on(rail);
        }
        for (i, gpio) in self.cfg.gpio.iter().enumerate() {
            let Some(gpio) = gpio else { continue };
            match self.board.gpio_request(gpio) {
                Ok(handle) => self.state.lock().gpio[i] = Some(handle),
                Err(e) => warn!("{}: request lcd_gpio_{i} failed: {e}", self.name),
            }
        }
    }

    fn gpio_exit(&self) {
        for (i, gpio) in self.cfg.gpio.iter().enumerate().rev() {
            let handle = self.state.lock().gpio[i].take();
            let (Some(handle), Some(gpio)) = (handle, gpio) else {
                continue;
            };
            self.board.gpio_release(handle);
            match self.board.gpio_request(&gpio.disabled()) {
                Ok(handle) => self.board.gpio_release(handle),
                Err(e) => warn!("{}: park lcd_gpio_{i} failed: {e}", self.name),
            }
        }
        for rail in self.cfg.gpio_power.iter().rev().flatten() {
            self.rail_off(rail);
        }
    }

    fn build_flow(&self, kind: FlowKind) {
        self.flows.lock().get_mut(kind).clear();
        let Some(panel) = self.bound_panel() else {
            warn!("{}: no panel bound, {} flow is empty", self.name, kind.as_str());
            return;
        };
        let result = match kind {
            FlowKind::Open => panel.cfg_open_flow(self),
            FlowKind::Close => panel.cfg_close_flow(self),
        };
        if let Err(e) = result {
            warn!("{}: panel {} {} flow: {e}", self.name, panel.name(), kind.as_str());
        }
    }

    fn run_flow(&self, kind: FlowKind) {
        let steps = core::mem::take(self.flows.lock().get_mut(kind));
        for (i, step) in steps.iter().enumerate() {
            (step.func)(self);
            self.delay_ms(step.delay_ms);
            info!(
                "{}: {} flow step {i} done, delay {} ms",
                self.name,
                kind.as_str(),
                step.delay_ms
            );
        }
        *self.flows.lock().get_mut(kind) = steps;
    }

    /// Number of steps currently registered for a flow
    pub fn flow_len(&self, kind: FlowKind) -> usize {
        self.flows.lock().get(kind).len()
    }

    fn push_flow<F>(&self, kind: FlowKind, func: F, delay_ms: u32) -> Result<(), LcdError>
    where
        F: Fn(&Lcd<B>) + Send + Sync + 'static,
    {
        let step = FlowStep {
            func: Box::new(func),
            delay_ms,
        };
        self.flows.lock().get_mut(kind).push(step).map_err(|_| {
            warn!("{}: {} flow is full", self.name, kind.as_str());
            LcdError::FlowFull
        })
    }

    /// Append a step to the open flow
    pub fn set_open_func<F>(&self, func: F, delay_ms: u32) -> Result<(), LcdError>
    where
        F: Fn(&Lcd<B>) + Send + Sync + 'static,
    {
        self.push_flow(FlowKind::Open, func, delay_ms)
    }

    /// Append a step to the close flow
    pub fn set_close_func<F>(&self, func: F, delay_ms: u32) -> Result<(), LcdError>
    where
        F: Fn(&Lcd<B>) + Send + Sync + 'static,
    {
        self.push_flow(FlowKind::Close, func, delay_ms)
    }

    /// Bind a panel plugin
    ///
    /// `name` must match the display's `lcd_driver_name`. The panel gets a
    /// chance to adjust the extended parameters before it is stored.
    pub fn set_panel_func(&self, name: &str, panel: Arc<dyn Panel<B>>) -> Result<(), LcdError> {
        if self.cfg.driver_name.as_deref() != Some(name) {
            return Err(LcdError::PanelMismatch);
        }

        let mut extend = self.state.lock().extend.clone();
        match panel.cfg_panel_info(&mut extend) {
            Ok(()) => {}
            Err(LcdError::NotSupported) => {}
            Err(e) => warn!("{}: panel {name} cfg_panel_info: {e}", self.name),
        }
        {
            let mut state = self.state.lock();
            state.extend = extend;
            state.recompute_gamma();
        }

        *self.panel.lock() = Some(panel);
        info!("{}: panel {name} bound", self.name);
        Ok(())
    }

    /// Set the backlight brightness, clamped to 255
    ///
    /// Programs the PWM duty through the brightness curve and dimming
    /// factor, and forwards the curve output to the panel while enabled.
    pub fn set_bright(&self, bright: u32) -> Result<(), LcdError> {
        let bright = bright.min(255);
        let adjusted = self.curve.adjust(if bright == 0 { 0 } else { bright + 1 });

        let (dimming, enabled) = {
            let mut state = self.state.lock();
            if state.backlight_bright != bright {
                state.backlight_bright = bright;
            }
            if state.backlight_dimming == 0 {
                state.backlight_dimming = DIMMING_MAX;
            }
            (state.backlight_dimming, state.enabled)
        };

        if let Some(pwm) = self.pwm {
            let duty = duty_ns(adjusted, dimming, self.pwm_period_ns);
            self.state.lock().pwm_duty_ns = duty;
            debug!(
                "{}: bright {bright} -> {adjusted}, duty {duty} / {} ns",
                self.name, self.pwm_period_ns
            );
            if let Err(e) = self.board.pwm_config(pwm, duty, self.pwm_period_ns) {
                warn!("{}: pwm config failed: {e}", self.name);
            }
        }

        if enabled {
            match self.bound_panel().map(|panel| panel.set_bright(self, adjusted)) {
                Some(Ok(())) => {}
                None | Some(Err(LcdError::NotSupported)) => {
                    warn!("{}: panel has no set_bright", self.name);
                }
                Some(Err(e)) => warn!("{}: panel set_bright: {e}", self.name),
            }
        }
        Ok(())
    }

    /// Last stored raw brightness
    pub fn get_bright(&self) -> u32 {
        self.state.lock().backlight_bright
    }

    /// Set the dimming factor, clamped to 256, and re-apply brightness
    pub fn set_bright_dimming(&self, dimming: u32) -> Result<(), LcdError> {
        let bright = {
            let mut state = self.state.lock();
            state.backlight_dimming = dimming.min(DIMMING_MAX);
            state.backlight_bright
        };
        self.set_bright(bright)
    }

    /// Current dimming factor
    pub fn bright_dimming(&self) -> u32 {
        self.state.lock().backlight_dimming
    }

    /// Last programmed PWM duty in ns
    pub fn pwm_duty_ns(&self) -> u32 {
        self.state.lock().pwm_duty_ns
    }

    /// PWM period in ns, 0 without a PWM backlight
    pub fn pwm_period_ns(&self) -> u32 {
        self.pwm_period_ns
    }

    /// Turn the backlight enable line on
    ///
    /// Returns [`LcdError::Busy`] when the backlight is already on.
    pub fn backlight_enable(&self) -> Result<(), LcdError> {
        {
            let mut state = self.state.lock();
            if state.bl_enabled {
                return Err(LcdError::Busy);
            }
            state.bl_need_enabled = true;
            state.bl_enabled = true;
        }

        if let Some(gpio) = &self.cfg.bl_en {
            if let Some(rail) = &self.cfg.bl_en_power {
                self.rail_on(rail);
            }
            match self.board.gpio_request(gpio) {
                Ok(handle) => self.state.lock().bl_gpio = Some(handle),
                Err(e) => warn!("{}: request lcd_bl_en failed: {e}", self.name),
            }
        }

        let bright = self.get_bright();
        self.set_bright(bright)
    }

    /// Turn the backlight enable line off
    ///
    /// Returns [`LcdError::Busy`] when the backlight is already off.
    pub fn backlight_disable(&self) -> Result<(), LcdError> {
        let handle = {
            let mut state = self.state.lock();
            if !state.bl_enabled {
                return Err(LcdError::Busy);
            }
            state.bl_enabled = false;
            state.bl_gpio.take()
        };

        if self.cfg.bl_en.is_some() {
            if let Some(handle) = handle {
                self.board.gpio_release(handle);
            }
            if let Some(rail) = &self.cfg.bl_en_power {
                self.rail_off(rail);
            }
        }
        Ok(())
    }

    /// Whether the backlight is on
    pub fn is_backlight_enabled(&self) -> bool {
        self.state.lock().bl_enabled
    }

    /// Whether the backlight was requested since the last enable or disable
    pub fn is_backlight_requested(&self) -> bool {
        self.state.lock().bl_need_enabled
    }

    fn program_pwm(&self, pwm: PwmHandle, duty: u32, polarity: Polarity) {
        if let Err(e) = self.board.pwm_config(pwm, duty, self.pwm_period_ns) {
            warn!("{}: pwm config failed: {e}", self.name);
        }
        if let Err(e) = self.board.pwm_set_polarity(pwm, polarity) {
            warn!("{}: pwm polarity failed: {e}", self.name);
        }
    }

    /// Start the backlight PWM output
    pub fn pwm_enable(&self) -> Result<(), LcdError> {
        let pwm = self.pwm.ok_or(LcdError::Resource(ResourceError::NotPresent))?;
        self.board.pwm_enable(pwm)?;
        self.state.lock().pwm_enabled = true;
        Ok(())
    }

    /// Stop the backlight PWM output
    ///
    /// Afterwards the channel is left programmed one ns short of the current
    /// duty with inverted polarity, so the next enable starts from a clean
    /// state.
    pub fn pwm_disable(&self) -> Result<(), LcdError> {
        let pwm = self.pwm.ok_or(LcdError::Resource(ResourceError::NotPresent))?;
        self.board.pwm_disable(pwm)?;
        let duty = {
            let mut state = self.state.lock();
            state.pwm_enabled = false;
            state.pwm_duty_ns
        };
        self.program_pwm(pwm, duty.saturating_sub(1), self.pwm_polarity.inverted());
        Ok(())
    }

    /// Whether the PWM output is running
    pub fn is_pwm_enabled(&self) -> bool {
        self.state.lock().pwm_enabled
    }

    fn power_rail(&self, id: usize) -> Result<Option<&str>, LcdError> {
        if id >= LCD_POWER_NUM {
            return Err(LcdError::InvalidIndex {
                index: id,
                max: LCD_POWER_NUM,
            });
        }
        Ok(self.cfg.power[id].as_deref())
    }

    /// Enable switchable rail `lcd_power<id>`
    pub fn power_enable(&self, id: usize) -> Result<(), LcdError> {
        let Some(rail) = self.power_rail(id)? else {
            return Ok(());
        };
        self.board.power_enable(rail)?;
        self.state.lock().power_enabled |= 1 << id;
        Ok(())
    }

    /// Disable switchable rail `lcd_power<id>`
    pub fn power_disable(&self, id: usize) -> Result<(), LcdError> {
        let Some(rail) = self.power_rail(id)? else {
            return Ok(());
        };
        self.board.power_disable(rail)?;
        self.state.lock().power_enabled &= !(1 << id);
        Ok(())
    }

    /// Whether switchable rail `lcd_power<id>` is on
    pub fn is_power_enabled(&self, id: usize) -> bool {
        id < LCD_POWER_NUM && self.state.lock().power_enabled & (1 << id) != 0
    }

    /// Route the display pin group on or park it
    pub fn pin_cfg(&self, on: bool) -> Result<(), LcdError> {
        let device = section_name(self.disp);
        info!("{}: pin config {}", self.name, if on { "on" } else { "off" });
        if on {
            for rail in self.cfg.pin_power.iter().flatten() {
                self.rail_on(rail);
            }
            if let Err(e) = self.board.pin_set_state(&device, PinState::Active) {
                warn!("{}: pin state active failed: {e}", self.name);
            }
        } else {
            if let Err(e) = self.board.pin_set_state(&device, PinState::Sleep) {
                warn!("{}: pin state sleep failed: {e}", self.name);
            }
            for rail in self.cfg.pin_power.iter().rev().flatten() {
                self.rail_off(rail);
            }
        }
        Ok(())
    }

    fn gpio_handle(&self, index: usize) -> Result<GpioHandle, LcdError> {
        if index >= LCD_GPIO_NUM {
            return Err(LcdError::InvalidIndex {
                index,
                max: LCD_GPIO_NUM,
            });
        }
        self.state.lock().gpio[index]
            .ok_or(LcdError::Resource(ResourceError::NotPresent))
    }

    /// Drive board GPIO `index`
    pub fn gpio_set_value(&self, index: usize, high: bool) -> Result<(), LcdError> {
        let handle = self.gpio_handle(index)?;
        Ok(self.board.gpio_set_value(handle, high)?)
    }

    /// Read board GPIO `index`
    pub fn gpio_get_value(&self, index: usize) -> Result<bool, LcdError> {
        let handle = self.gpio_handle(index)?;
        Ok(self.board.gpio_get_value(handle)?)
    }

    /// Change the direction of board GPIO `index`
    pub fn gpio_set_direction(&self, index: usize, direction: Direction) -> Result<(), LcdError> {
        let handle = self.gpio_handle(index)?;
        Ok(self.board.gpio_set_direction(handle, direction)?)
    }

    /// Replace the first entries of the working gamma table
    ///
    /// At most [`GAMMA_TABLE_LEN`] entries are used.
    pub fn set_gamma_tbl(&self, table: &[u32]) -> Result<(), LcdError> {
        let len = table.len().min(GAMMA_TABLE_LEN);
        let mut state = self.state.lock();
        state.extend.gamma_tbl[..len].copy_from_slice(&table[..len]);
        state.refresh_gamma();
        Ok(())
    }

    /// Turn gamma correction on
    pub fn enable_gamma(&self) -> Result<(), LcdError> {
        let mut state = self.state.lock();
        if !state.extend.gamma_en {
            state.extend.gamma_en = true;
            state.refresh_gamma();
        }
        Ok(())
    }

    /// Turning gamma correction off is not supported
    ///
    /// Always returns [`LcdError::NotSupported`] and leaves state untouched.
    pub fn disable_gamma(&self) -> Result<(), LcdError> {
        debug!("{}: disable_gamma is not supported", self.name);
        Err(LcdError::NotSupported)
    }

    /// Set the color temperature bias, clamped to +/-256
    ///
    /// Positive values warm the image, negative values cool it.
    pub fn set_color_temperature(&self, temperature: i32) -> Result<(), LcdError> {
        let mut state = self.state.lock();
        state.color_temperature =
            temperature.clamp(-COLOR_TEMPERATURE_MAX, COLOR_TEMPERATURE_MAX);
        state.refresh_gamma();
        Ok(())
    }

    /// Current color temperature bias
    pub fn get_color_temperature(&self) -> i32 {
        self.state.lock().color_temperature
    }

    /// Set color inversion
    pub fn set_color_inverse(&self, inverse: bool) -> Result<(), LcdError> {
        let mut state = self.state.lock();
        state.color_inverse = inverse;
        state.refresh_gamma();
        Ok(())
    }

    /// Current color inversion
    pub fn get_color_inverse(&self) -> bool {
        self.state.lock().color_inverse
    }

    /// The working extended parameters
    pub fn extend_info(&self) -> PanelExtendInfo {
        self.state.lock().extend.clone()
    }

    /// Take the applied gamma snapshot if it changed since the last call
    pub fn take_gamma_update(&self) -> Option<PanelExtendInfo> {
        let mut state = self.state.lock();
        if !state.extend_dirty {
            return None;
        }
        state.extend_dirty = false;
        Some(state.extend_set.clone())
    }

    /// Push a framebuffer layer to the panel
    ///
    /// The visible area starting at line `yoffset` is sent in groups of
    /// `lines_per_transfer` lines. 32-bpp sources are packed to 24-bit wire
    /// pixels first.
    pub fn set_layer(&self, fb: &FbInfo<'_>) -> Result<(), LcdError> {
        let _guard = self.transfer.lock();
        let Some(panel) = self.bound_panel() else {
            debug!("{}: set_layer without panel", self.name);
            return Ok(());
        };

        let var = &fb.var;
        let line_length = fb.line_length as usize;
        let xres = var.xres as usize;
        let yres = var.yres as usize;
        let packed = var.bits_per_pixel == 32;
        let lines_per_group = (self.panel_info.lines_per_transfer as usize).max(1);

        if xres == 0 || yres == 0 || line_length == 0 {
            return Err(LcdError::InvalidLayer);
        }
        let start = (var.yoffset as usize).checked_mul(line_length);
        let end = yres
            .checked_mul(line_length)
            .and_then(|len| start?.checked_add(len));
        let (Some(start), Some(end)) = (start, end) else {
            return Err(LcdError::InvalidLayer);
        };
        let packed_line = xres.checked_mul(4);
        if end > fb.screen.len() || (packed && packed_line.is_none_or(|n| line_length < n)) {
            return Err(LcdError::InvalidLayer);
        }

        let wire_line = if packed { xres * 3 } else { line_length };
        let mut scratch = if packed {
            vec![0u8; wire_line * lines_per_group]
        } else {
            vec![]
        };

        let mut line = 0;
        while line < yres {
            let lines = lines_per_group.min(yres - line);
            let offset = start + line * line_length;
            let src = &fb.screen[offset..offset + lines * line_length];
            debug!("{}: layer lines {line}..{}", self.name, line + lines);

            let data = if packed {
                for (dst, row) in scratch
                    .chunks_exact_mut(wire_line)
                    .zip(src.chunks_exact(line_length))
                {
                    pack_rgb32_to_rgb24(&row[..xres * 4], dst);
                }
                &scratch[..lines * wire_line]
            } else {
                src
            };
            panel.set_layer(self, data)?;
            line += lines;
        }
        Ok(())
    }

    /// Pass a new visible geometry to the panel
    pub fn set_var(&self, var: &VarScreenInfo) -> Result<(), LcdError> {
        let _guard = self.transfer.lock();
        match self.bound_panel() {
            Some(panel) => panel.set_var(self, var),
            None => Ok(()),
        }
    }

    /// Blank or unblank the panel
    pub fn blank(&self, enable: bool) -> Result<(), LcdError> {
        let _guard = self.transfer.lock();
        match self.bound_panel() {
            Some(panel) => panel.blank(self, enable),
            None => Ok(()),
        }
    }

    /// Set the panel's RAM address window
    pub fn set_addr_win(&self, x: u32, y: u32, width: u32, height: u32) -> Result<(), LcdError> {
        let panel = self.bound_panel().ok_or(LcdError::NotSupported)?;
        panel.set_addr_win(self, x, y, width, height)
    }

    /// Call the panel's escape hatch
    pub fn user_defined_func(&self, para1: u32, para2: u32, para3: u32) -> Result<i32, LcdError> {
        let panel = self.bound_panel().ok_or(LcdError::NotSupported)?;
        panel.user_defined_func(self, para1, para2, para3)
    }
}

/// `(adjusted * dimming * period / 256 + 128) / 256`
fn duty_ns(adjusted: u32, dimming: u32, period_ns: u32) -> u32 {
    let raw = u64::from(adjusted) * u64::from(dimming) * u64::from(period_ns);
    saturate((raw / 256 + 128) / 256)
}

fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
