//! GPIO assignments for the blink board.
//!
//! Single source of truth: the GPIO bank and the default config reference
//! this module rather than hard-coding pin numbers.

/// Digital output driving the indicator LED (active HIGH).
pub const LED_GPIO: i32 = 26;

/// Highest GPIO number that can be configured as an output.
/// ESP32-S3 exposes GPIO0–GPIO48.
pub const MAX_OUTPUT_GPIO: i32 = 48;

/// Pins reserved by the module (flash/PSRAM bus) that must never be driven.
pub const RESERVED_GPIOS: [i32; 6] = [27, 28, 29, 30, 31, 32];

/// Whether `gpio` names a line that can be claimed as an output.
pub fn is_valid_output(gpio: i32) -> bool {
    (0..=MAX_OUTPUT_GPIO).contains(&gpio) && !RESERVED_GPIOS.contains(&gpio)
}
