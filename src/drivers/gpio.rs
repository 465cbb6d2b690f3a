//! GPIO output bank.
//!
//! Validates pin identity, tracks exclusive ownership, and hands out
//! [`GpioLine`]s that implement [`embedded_hal::digital::OutputPin`].
//!
//! ## Dual-target design
//!
//! On ESP-IDF: configures the pad as a push-pull output and drives it with
//! `gpio_set_level`.
//! On host/test: tracks the level in-memory only.

use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin, PinState};
use log::{debug, info, trace};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::app::ports::{PinDriver, PinError};
use crate::pins;

// ── Line ──────────────────────────────────────────────────────

/// A GPIO write was refused by the peripheral (ESP-IDF error code).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioWriteError(pub i32);

impl embedded_hal::digital::Error for GpioWriteError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// An owned output line.  Only [`GpioBank`] creates these.
#[derive(Debug)]
pub struct GpioLine {
    gpio: i32,
    level: PinState,
}

impl GpioLine {
    pub fn gpio(&self) -> i32 {
        self.gpio
    }

    /// Last level driven onto the pad.
    pub fn level(&self) -> PinState {
        self.level
    }

    fn drive(&mut self, level: PinState) -> Result<(), GpioWriteError> {
        self.set_level_hw(level)?;
        self.level = level;
        trace!("gpio{} -> {:?}", self.gpio, level);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn set_level_hw(&self, level: PinState) -> Result<(), GpioWriteError> {
        // SAFETY: the pad was configured as an output in `GpioBank::acquire`
        // and this line is its only owner.
        let ret = unsafe { gpio_set_level(self.gpio, u32::from(level == PinState::High)) };
        if ret != ESP_OK as i32 {
            return Err(GpioWriteError(ret));
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn set_level_hw(&self, _level: PinState) -> Result<(), GpioWriteError> {
        Ok(())
    }
}

impl ErrorType for GpioLine {
    type Error = GpioWriteError;
}

impl OutputPin for GpioLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(PinState::Low)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(PinState::High)
    }
}

// ── Bank ──────────────────────────────────────────────────────

/// Owner registry for the board's output GPIOs.
pub struct GpioBank {
    /// Bit `n` set = GPIO `n` is claimed.
    claimed: u64,
}

impl GpioBank {
    pub fn new() -> Self {
        Self { claimed: 0 }
    }

    pub fn is_claimed(&self, gpio: i32) -> bool {
        pins::is_valid_output(gpio) && self.claimed & (1u64 << gpio) != 0
    }

    #[cfg(target_os = "espidf")]
    fn configure_output(gpio: i32) -> Result<(), PinError> {
        // SAFETY: `gpio` was range-checked against the board's output set and
        // is not claimed by anyone else.
        unsafe {
            if gpio_reset_pin(gpio) != ESP_OK as i32 {
                return Err(PinError::ConfigFailed(gpio));
            }
            if gpio_set_direction(gpio, gpio_mode_t_GPIO_MODE_OUTPUT) != ESP_OK as i32 {
                return Err(PinError::ConfigFailed(gpio));
            }
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn configure_output(_gpio: i32) -> Result<(), PinError> {
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn reset_hw(gpio: i32) {
        // SAFETY: the line was just handed back; nobody drives it any more.
        unsafe {
            gpio_reset_pin(gpio);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn reset_hw(_gpio: i32) {}
}

impl Default for GpioBank {
    fn default() -> Self {
        Self::new()
    }
}

impl PinDriver for GpioBank {
    type Line = GpioLine;

    fn acquire(&mut self, gpio: i32) -> Result<GpioLine, PinError> {
        if !pins::is_valid_output(gpio) {
            return Err(PinError::InvalidPin(gpio));
        }
        if self.is_claimed(gpio) {
            return Err(PinError::Busy(gpio));
        }

        Self::configure_output(gpio)?;
        let mut line = GpioLine {
            gpio,
            level: PinState::Low,
        };
        line.drive(PinState::Low)
            .map_err(|_| PinError::ConfigFailed(gpio))?;

        self.claimed |= 1u64 << gpio;
        info!("gpio: claimed gpio{} as output (LOW)", gpio);
        Ok(line)
    }

    fn release(&mut self, line: GpioLine) {
        let gpio = line.gpio;
        Self::reset_hw(gpio);
        self.claimed &= !(1u64 << gpio);
        debug!("gpio: released gpio{}", gpio);
    }
}
