//! Output GPIO driver and worker-thread helpers.

pub mod gpio;
pub mod task_pin;
