//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing controller events to the logger
//! (UART / USB-CDC on the device, stderr in the host simulation).

use log::{debug, info, warn};

use crate::app::events::BlinkEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`BlinkEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &BlinkEvent) {
        match event {
            BlinkEvent::Started { interval_ms } => {
                info!("BLINK | started, interval={}ms", interval_ms);
            }
            BlinkEvent::Stopped => info!("BLINK | stop requested"),
            BlinkEvent::IntervalChanged { from_ms, to_ms } => {
                info!("BLINK | interval {}ms -> {}ms", from_ms, to_ms);
            }
            // One per toggle; too chatty for info.
            BlinkEvent::Toggled(level) => debug!("BLINK | toggled {:?}, re-queued", level),
            BlinkEvent::ChainEnded => info!("BLINK | chain ended, pin LOW"),
            BlinkEvent::RearmFailed => warn!("BLINK | re-arm failed, pin LOW"),
            BlinkEvent::CommandRejected(e) => warn!("BLINK | command rejected: {}", e),
        }
    }
}
