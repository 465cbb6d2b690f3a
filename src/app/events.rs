//! Outbound controller events.
//!
//! The [`BlinkController`](super::controller::BlinkController) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on the
//! other side decide what to do with them (log to serial, count them in a
//! test, ...).

use embedded_hal::digital::PinState;

use crate::error::CommandError;

/// Structured events emitted by the blink core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkEvent {
    /// Blinking started; the first toggle is due after `interval_ms`.
    Started { interval_ms: u32 },

    /// Blinking was asked to stop.  The pending callback ends the chain.
    Stopped,

    /// A new interval was stored.  It applies from the next re-arm.
    IntervalChanged { from_ms: u32, to_ms: u32 },

    /// The callback toggled the pin and re-armed itself.
    Toggled(PinState),

    /// The callback observed Stopped, drove the pin LOW and did not re-arm.
    ChainEnded,

    /// The callback could not re-arm; blinking was stopped.
    RearmFailed,

    /// A control-surface write was rejected.
    CommandRejected(CommandError),
}
