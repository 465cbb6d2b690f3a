//! Deferred-task schedulers.
//!
//! | Scheduler          | Backed by                         | Used on  |
//! |--------------------|-----------------------------------|----------|
//! | [`TimerScheduler`] | ESP-IDF `esp_timer` task dispatch | device   |
//! | [`WorkQueue`]      | one worker thread + condvar       | host/sim |
//!
//! Both implement [`TaskScheduler`](crate::app::ports::TaskScheduler) with
//! the same slot semantics; [`PlatformScheduler`] names the one the binary
//! brings up on the current target.

pub mod timer;
pub mod work_queue;

pub use timer::{TimerBackend, TimerScheduler};
pub use work_queue::WorkQueue;

#[cfg(target_os = "espidf")]
pub type PlatformScheduler = TimerScheduler<esp_idf_svc::timer::EspTaskTimerService>;

#[cfg(not(target_os = "espidf"))]
pub type PlatformScheduler = WorkQueue;
