//! Blink interval and scheduler tick units.
//!
//! The interval is stored in scheduler ticks of 10 ms.  Externally it is
//! always shown in milliseconds, so a write of `255` is stored as 25 ticks
//! and reads back as `250`.

use core::time::Duration;

use crate::error::CommandError;

/// Length of one scheduler tick in milliseconds.
pub const TICK_MS: u32 = 10;

/// A delay expressed in scheduler ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticks(pub u32);

impl Ticks {
    pub fn as_duration(self) -> Duration {
        Duration::from_millis(u64::from(self.0) * u64::from(TICK_MS))
    }
}

/// Time between two toggles while blinking.
///
/// Always within [5, 100] ticks; there is no way to build one outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Interval(u32);

impl Interval {
    /// Smallest accepted write, in milliseconds.
    pub const MIN_MS: i64 = 50;
    /// Largest accepted write, in milliseconds.
    pub const MAX_MS: i64 = 1000;
    /// Power-up interval: 50 ticks (500 ms).
    pub const DEFAULT: Self = Self(50);

    /// Validate a millisecond value and truncate it onto the tick grid.
    pub fn from_millis(ms: i64) -> Result<Self, CommandError> {
        if !(Self::MIN_MS..=Self::MAX_MS).contains(&ms) {
            return Err(CommandError::OutOfRange(ms));
        }
        Ok(Self(ms as u32 / TICK_MS))
    }

    pub fn ticks(self) -> Ticks {
        Ticks(self.0)
    }

    /// External value: ticks × 10.
    pub fn as_millis(self) -> u32 {
        self.0 * TICK_MS
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::DEFAULT
    }
}
