//! Inbound commands to the blink controller.
//!
//! A control-surface write is decoded into a [`BlinkCommand`] against the
//! controller's *current* state, under the controller's lock, so the state
//! check and the action it selects cannot be separated by a timer callback.

use super::controller::BlinkState;
use super::interval::Interval;
use crate::error::CommandError;

/// Operations a control-surface write can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkCommand {
    /// Begin blinking.
    Start,
    /// Stop blinking; the pending callback drives the pin LOW.
    Stop,
    /// Store a new interval for the next re-arm.
    SetInterval(Interval),
}

impl BlinkCommand {
    /// Decode a written payload.
    ///
    /// Rules, first match wins:
    /// 1. `on` while Stopped starts blinking.
    /// 2. `off` while Running stops it.
    /// 3. A base-10 integer in [50, 1000] sets the interval.
    /// 4. Anything else is rejected.
    ///
    /// `on` while Running and `off` while Stopped fall through to rule 3 and
    /// are rejected as [`CommandError::NotANumber`].  One trailing newline is
    /// ignored.
    pub fn parse(payload: &str, state: BlinkState) -> Result<Self, CommandError> {
        let text = payload.strip_suffix('\n').unwrap_or(payload);

        match (state, text) {
            (BlinkState::Stopped, "on") => return Ok(Self::Start),
            (BlinkState::Running, "off") => return Ok(Self::Stop),
            _ => {}
        }

        if text.is_empty() {
            return Err(CommandError::Empty);
        }
        let ms: i64 = text.parse().map_err(|_| CommandError::NotANumber)?;
        Interval::from_millis(ms).map(Self::SetInterval)
    }
}
