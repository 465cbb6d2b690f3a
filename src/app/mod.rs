//! Application core — the blink state machine and its text front end.
//!
//! All interaction with the GPIO, the deferred-task worker and the node
//! registry happens through the **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals or threads.

pub mod commands;
pub mod control;
pub mod controller;
pub mod events;
pub mod interval;
pub mod ports;
