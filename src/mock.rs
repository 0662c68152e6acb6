//! Recording test doubles shared by the unit tests

use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cell::Cell;
use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::{ErrorType, Operation, SpiDevice};
use spin::Mutex;

use crate::board::{
    Board, Direction, GpioConfig, GpioHandle, PinState, Polarity, PwmHandle, GPIO_MUX_DISABLED,
};
use crate::error::{LcdError, ResourceError};
use crate::lcd::Lcd;
use crate::panel::{Panel, VarScreenInfo};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    PowerOn(String),
    PowerOff(String),
    GpioRequest { gpio: u32, mul_sel: u32 },
    GpioRelease(u32),
    GpioSet(u32, bool),
    GpioDirection(u32, Direction),
    PinState(String, PinState),
    PwmRequest(u32),
    PwmConfig { duty_ns: u32, period_ns: u32 },
    PwmPolarity(Polarity),
    PwmEnable,
    PwmDisable,
    Delay(u32),
}

type Log = Arc<Mutex<Vec<Event>>>;
type DelayHook = Arc<Mutex<Option<Box<dyn Fn() + Send + Sync>>>>;

std::thread_local! {
    static WARNINGS: Cell<usize> = const { Cell::new(0) };
}

struct WarnCounter;

impl log::Log for WarnCounter {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::Level::Warn
    }

    fn log(&self, record: &log::Record<'_>) {
        if record.level() == log::Level::Warn {
            WARNINGS.with(|w| w.set(w.get() + 1));
        }
    }

    fn flush(&self) {}
}

static WARN_COUNTER: WarnCounter = WarnCounter;

/// Run `f` and count the warnings it logs on this thread
pub fn count_warnings<R>(f: impl FnOnce() -> R) -> (R, usize) {
    let _ = log::set_logger(&WARN_COUNTER);
    log::set_max_level(log::LevelFilter::Warn);
    let before = WARNINGS.with(Cell::get);
    let result = f();
    (result, WARNINGS.with(Cell::get) - before)
}

/// Board that records every call
#[derive(Clone, Default)]
pub struct MockBoard {
    events: Log,
    failing_rail: Arc<Mutex<Option<String>>>,
    failing_gpio: Arc<Mutex<Option<u32>>>,
    delay_hook: DelayHook,
}

impl MockBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn fail_rail(&self, name: &str) {
        *self.failing_rail.lock() = Some(name.to_string());
    }

    /// Make every request of `gpio` fail, except parking it
    pub fn fail_gpio(&self, gpio: u32) {
        *self.failing_gpio.lock() = Some(gpio);
    }

    /// Call `hook` after every recorded delay
    pub fn on_delay(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.delay_hook.lock() = Some(Box::new(hook));
    }

    fn record(&self, event: Event) {
        self.events.lock().push(event);
    }
}

pub struct MockDelay {
    events: Log,
    hook: DelayHook,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.events.lock().push(Event::Delay(ms));
        if let Some(hook) = self.hook.lock().as_ref() {
            hook();
        }
    }
}

impl Board for MockBoard {
    type Delay = MockDelay;

    fn delay(&self) -> MockDelay {
        MockDelay {
            events: self.events.clone(),
            hook: self.delay_hook.clone(),
        }
    }

    fn power_enable(&self, name: &str) -> Result<(), ResourceError> {
        if self.failing_rail.lock().as_deref() == Some(name) {
            return Err(ResourceError::NotFound);
        }
        self.record(Event::PowerOn(name.to_string()));
        Ok(())
    }

    fn power_disable(&self, name: &str) -> Result<(), ResourceError> {
        self.record(Event::PowerOff(name.to_string()));
        Ok(())
    }

    fn gpio_request(&self, gpio: &GpioConfig) -> Result<GpioHandle, ResourceError> {
        if gpio.mul_sel != GPIO_MUX_DISABLED && *self.failing_gpio.lock() == Some(gpio.gpio) {
            return Err(ResourceError::Busy);
        }
        self.record(Event::GpioRequest {
            gpio: gpio.gpio,
            mul_sel: gpio.mul_sel,
        });
        Ok(GpioHandle(gpio.gpio))
    }

    fn gpio_release(&self, handle: GpioHandle) {
        self.record(Event::GpioRelease(handle.0));
    }

    fn gpio_set_value(&self, handle: GpioHandle, high: bool) -> Result<(), ResourceError> {
        self.record(Event::GpioSet(handle.0, high));
        Ok(())
    }

    fn gpio_get_value(&self, _handle: GpioHandle) -> Result<bool, ResourceError> {
        Ok(true)
    }

    fn gpio_set_direction(
        &self,
        handle: GpioHandle,
        direction: Direction,
    ) -> Result<(), ResourceError> {
        self.record(Event::GpioDirection(handle.0, direction));
        Ok(())
    }

    fn pin_set_state(&self, device: &str, state: PinState) -> Result<(), ResourceError> {
        self.record(Event::PinState(device.to_string(), state));
        Ok(())
    }

    fn pwm_request(&self, channel: u32) -> Result<PwmHandle, ResourceError> {
        self.record(Event::PwmRequest(channel));
        Ok(PwmHandle(channel))
    }

    fn pwm_config(
        &self,
        _pwm: PwmHandle,
        duty_ns: u32,
        period_ns: u32,
    ) -> Result<(), ResourceError> {
        self.record(Event::PwmConfig { duty_ns, period_ns });
        Ok(())
    }

    fn pwm_set_polarity(&self, _pwm: PwmHandle, polarity: Polarity) -> Result<(), ResourceError> {
        self.record(Event::PwmPolarity(polarity));
        Ok(())
    }

    fn pwm_enable(&self, _pwm: PwmHandle) -> Result<(), ResourceError> {
        self.record(Event::PwmEnable);
        Ok(())
    }

    fn pwm_disable(&self, _pwm: PwmHandle) -> Result<(), ResourceError> {
        self.record(Event::PwmDisable);
        Ok(())
    }
}

/// Panel that records capability calls by name
#[derive(Clone)]
pub struct MockPanel {
    name: &'static str,
    calls: Arc<Mutex<Vec<String>>>,
    layers: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MockPanel {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            calls: Arc::default(),
            layers: Arc::default(),
        }
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().iter().filter(|c| *c == call).count()
    }

    pub fn layers(&self) -> Vec<Vec<u8>> {
        self.layers.lock().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }
}

impl<B: Board> Panel<B> for MockPanel {
    fn name(&self) -> &str {
        self.name
    }

    fn cfg_open_flow(&self, lcd: &Lcd<B>) -> Result<(), LcdError> {
        let panel = self.clone();
        lcd.set_open_func(move |_| panel.record("open".to_string()), 10)?;
        let panel = self.clone();
        lcd.set_open_func(move |_| panel.record("opened".to_string()), 20)
    }

    fn cfg_close_flow(&self, lcd: &Lcd<B>) -> Result<(), LcdError> {
        let panel = self.clone();
        lcd.set_close_func(move |_| panel.record("close".to_string()), 5)
    }

    fn set_bright(&self, _lcd: &Lcd<B>, bright: u32) -> Result<(), LcdError> {
        self.record(alloc::format!("bright {bright}"));
        Ok(())
    }

    fn set_layer(&self, _lcd: &Lcd<B>, data: &[u8]) -> Result<(), LcdError> {
        self.layers.lock().push(data.to_vec());
        Ok(())
    }

    fn blank(&self, _lcd: &Lcd<B>, enable: bool) -> Result<(), LcdError> {
        self.record(alloc::format!("blank {enable}"));
        Ok(())
    }

    fn set_var(&self, _lcd: &Lcd<B>, _var: &VarScreenInfo) -> Result<(), LcdError> {
        self.record("set_var".to_string());
        Ok(())
    }
}

/// SPI device that records each write
#[derive(Clone, Default)]
pub struct MockSpi {
    writes: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MockSpi {
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.writes.lock().clone()
    }

    pub fn clear(&self) {
        self.writes.lock().clear();
    }
}

impl ErrorType for MockSpi {
    type Error = Infallible;
}

impl SpiDevice for MockSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        for op in operations.iter() {
            if let Operation::Write(data) = op {
                self.writes.lock().push(data.to_vec());
            }
        }
        Ok(())
    }
}
