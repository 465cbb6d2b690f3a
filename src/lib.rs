//! Blink controller library.
//!
//! Drives one output GPIO on and off at a configurable interval through a
//! deferred, self re-arming task, behind a single read/write text endpoint.
//! All ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module; everything else runs and is tested on the host.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod lifecycle;
pub mod pins;
pub mod scheduler;

pub use error::{Error, Result};
