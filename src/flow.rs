//! Open/close flow sequencing
//!
//! A flow is the ordered list of steps a panel plugin registers to power its
//! display up or down. Each step is a callback plus a delay in milliseconds
//! that the engine blocks for after running it.
//!
//! Lists are rebuilt from scratch on every enable/disable cycle and hold at
//! most [`LCD_MAX_SEQUENCES`] steps.

use alloc::boxed::Box;

use crate::board::Board;
use crate::lcd::Lcd;

/// Maximum number of steps in one flow
pub const LCD_MAX_SEQUENCES: usize = 7;

/// Step callback
pub type FlowFn<B> = Box<dyn Fn(&Lcd<B>) + Send + Sync>;

/// One flow step
pub struct FlowStep<B: Board> {
    /// Callback run on the caller's thread
    pub func: FlowFn<B>,
    /// Blocking wait after the callback, 0 for none
    pub delay_ms: u32,
}

impl<B: Board> core::fmt::Debug for FlowStep<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FlowStep")
            .field("delay_ms", &self.delay_ms)
            .finish_non_exhaustive()
    }
}

/// Fixed-capacity step list
pub type Flow<B> = heapless::Vec<FlowStep<B>, LCD_MAX_SEQUENCES>;

/// Which of the two flows
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowKind {
    /// Power-up flow run by enable
    Open,
    /// Power-down flow run by disable
    Close,
}

impl FlowKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
        }
    }
}

/// Both flow lists of a display
pub(crate) struct Flows<B: Board> {
    open: Flow<B>,
    close: Flow<B>,
}

impl<B: Board> Flows<B> {
    pub(crate) fn new() -> Self {
        Self {
            open: Flow::new(),
            close: Flow::new(),
        }
    }

    pub(crate) fn get_mut(&mut self, kind: FlowKind) -> &mut Flow<B> {
        match kind {
            FlowKind::Open => &mut self.open,
            FlowKind::Close => &mut self.close,
        }
    }

    pub(crate) fn get(&self, kind: FlowKind) -> &Flow<B> {
        match kind {
            FlowKind::Open => &self.open,
            FlowKind::Close => &self.close,
        }
    }
}
