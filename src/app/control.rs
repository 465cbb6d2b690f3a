//! Control surface — the single read/write text endpoint.
//!
//! Writes are decoded and applied by the controller under its lock; reads
//! render the interval as `"<N> milliseconds\n"`.

use core::fmt::Write as _;
use std::sync::Arc;

use embedded_hal::digital::OutputPin;
use log::debug;

use super::commands::BlinkCommand;
use super::controller::BlinkController;
use super::ports::{EventSink, TaskScheduler};
use crate::error::Result;

/// Longest status line: `"1000 milliseconds\n"`.
pub const STATUS_CAPACITY: usize = 32;

/// Rendered status text.
pub type StatusLine = heapless::String<STATUS_CAPACITY>;

/// Text front end of a [`BlinkController`].
pub struct ControlSurface<P, S, E> {
    controller: Arc<BlinkController<P, S, E>>,
}

impl<P, S, E> Clone for ControlSurface<P, S, E> {
    fn clone(&self) -> Self {
        Self {
            controller: Arc::clone(&self.controller),
        }
    }
}

impl<P, S, E> ControlSurface<P, S, E>
where
    P: OutputPin + Send + 'static,
    S: TaskScheduler + 'static,
    E: EventSink + 'static,
{
    pub fn new(controller: Arc<BlinkController<P, S, E>>) -> Self {
        Self { controller }
    }

    /// Handle a write.  On error nothing changed.
    pub fn handle_command(&self, text: &str) -> Result<BlinkCommand> {
        debug!("control: store called, payload {:?}", text);
        self.controller.apply(text)
    }

    /// Handle a read.
    pub fn render_status(&self) -> StatusLine {
        let mut line = StatusLine::new();
        let written = writeln!(line, "{} milliseconds", self.controller.get_interval_ms());
        debug_assert!(written.is_ok(), "status line exceeds STATUS_CAPACITY");
        line
    }

    pub fn controller(&self) -> &Arc<BlinkController<P, S, E>> {
        &self.controller
    }
}
