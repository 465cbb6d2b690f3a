//! System configuration parameters
//!
//! All tunable parameters for the blink controller.  Values come from
//! defaults, optionally overridden by a JSON file and command-line flags
//! on the host binary.  Nothing is persisted across restarts.

use serde::{Deserialize, Serialize};

use crate::app::interval::Interval;
use crate::error::{Error, Result};
use crate::pins;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    // --- Output ---
    /// GPIO driven by the controller
    pub pin: i32,

    // --- Registration ---
    /// Name of the control-surface node
    pub device_name: String,
    /// Class the node is registered under
    pub class_name: String,

    // --- Worker ---
    /// Name of the deferred-task worker thread
    pub workqueue_name: String,
    /// Callback slots available on the worker
    pub max_active: u8,

    // --- Timing ---
    /// Blink interval at power-up (milliseconds, 50–1000)
    pub initial_interval_ms: u32,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            pin: pins::LED_GPIO,
            device_name: "led02".into(),
            class_name: "ledclass".into(),
            workqueue_name: "blink_wq".into(),
            max_active: 4,
            initial_interval_ms: Interval::DEFAULT.as_millis(),
        }
    }
}

impl BlinkConfig {
    /// Reject configurations the controller cannot start with.
    ///
    /// The pin is not checked here: the GPIO bank validates it when the line
    /// is claimed, last in bring-up.
    pub fn validate(&self) -> Result<()> {
        if self.device_name.is_empty() || self.class_name.is_empty() {
            return Err(Error::Config("device and class names must be non-empty"));
        }
        if self.workqueue_name.is_empty() {
            return Err(Error::Config("workqueue name must be non-empty"));
        }
        if self.max_active == 0 {
            return Err(Error::Config("max_active must be at least 1"));
        }
        self.initial_interval()?;
        Ok(())
    }

    /// The power-up interval, range-checked.
    pub fn initial_interval(&self) -> Result<Interval> {
        Interval::from_millis(i64::from(self.initial_interval_ms))
            .map_err(|_| Error::Config("initial_interval_ms outside [50,1000]"))
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed JSON"))?;
        config.validate()?;
        Ok(config)
    }
}
