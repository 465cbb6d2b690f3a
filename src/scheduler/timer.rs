//! Timer-service scheduler (device scheduler).
//!
//! Each callback slot owns one one-shot platform timer.  Queueing a task
//! parks it in the slot and arms the timer; when the timer fires the task is
//! taken out of the slot before it runs, so it can queue itself again.
//!
//! ```text
//!  schedule(slot, ticks, task) ──▶ slot.task = task, arm(timer, ticks)
//!  timer expires (esp_timer task) ──▶ take slot.task, run it
//!  flush_and_destroy() ──▶ cancel timers, wait for running callbacks,
//!                          run parked tasks, delete timers
//! ```
//!
//! On ESP-IDF the timers come from `EspTaskTimerService`, whose callbacks
//! run in the `esp_timer` task (not ISR context), so a task may lock the
//! controller and write a GPIO.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use std::time::Duration;

use log::{debug, info};

use crate::app::interval::Ticks;
use crate::app::ports::{DeferredTask, SchedulerError, SlotId, TaskScheduler};

/// Runs each time a one-shot timer expires.
pub type TimerCallback = Box<dyn FnMut() + Send + 'static>;

/// Source of one-shot timers.
pub trait TimerBackend: Send {
    type Timer: Send;

    /// Create a disarmed timer that runs `callback` on expiry.
    fn create(&self, callback: TimerCallback) -> Result<Self::Timer, SchedulerError>;

    /// Arm `timer` to fire once after `delay`.
    fn arm(timer: &Self::Timer, delay: Duration) -> Result<(), SchedulerError>;

    /// Disarm `timer`.  A callback already running is not interrupted.
    fn cancel(timer: &Self::Timer);
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// State shared between a slot and its timer callback.
///
/// Lock order: `running` before `task`.
struct SlotShared {
    task: Mutex<Option<DeferredTask>>,
    /// Thread currently running this slot's task.
    running: Mutex<Option<ThreadId>>,
    idle: Condvar,
}

impl SlotShared {
    fn fire(&self) {
        let mut running = lock(&self.running);
        let due = lock(&self.task).take();
        let Some(due) = due else {
            return;
        };
        *running = Some(thread::current().id());
        drop(running);

        due();

        *lock(&self.running) = None;
        self.idle.notify_all();
    }

    /// Wait out a running callback, then take whatever is still parked.
    fn drain(&self) -> Option<DeferredTask> {
        let me = thread::current().id();
        let mut running = lock(&self.running);
        while running.is_some_and(|id| id != me) {
            running = self
                .idle
                .wait(running)
                .unwrap_or_else(PoisonError::into_inner);
        }
        lock(&self.task).take()
    }
}

struct Slot<T> {
    timer: T,
    shared: Arc<SlotShared>,
}

struct TimerState<B: TimerBackend> {
    backend: B,
    max_active: u8,
    slots: Vec<Slot<B::Timer>>,
    destroyed: bool,
}

/// [`TaskScheduler`] on one-shot platform timers, one per slot.
pub struct TimerScheduler<B: TimerBackend> {
    name: String,
    state: Mutex<TimerState<B>>,
}

impl<B: TimerBackend> TimerScheduler<B> {
    pub fn new(name: &str, backend: B, max_active: u8) -> Self {
        info!("timer '{}': ready ({} slots)", name, max_active);
        Self {
            name: name.into(),
            state: Mutex::new(TimerState {
                backend,
                max_active,
                slots: Vec::with_capacity(usize::from(max_active)),
                destroyed: false,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of slots holding a task that has not started yet.
    pub fn queued(&self) -> usize {
        lock(&self.state)
            .slots
            .iter()
            .filter(|s| lock(&s.shared.task).is_some())
            .count()
    }
}

#[cfg(target_os = "espidf")]
impl TimerScheduler<esp_idf_svc::timer::EspTaskTimerService> {
    /// Build on the system `esp_timer` task with `max_active` slots.
    pub fn start(name: &str, max_active: u8) -> Result<Self, SchedulerError> {
        let service = esp_idf_svc::timer::EspTaskTimerService::new().map_err(|e| {
            log::error!("timer '{}': timer service unavailable: {}", name, e);
            SchedulerError::SpawnFailed
        })?;
        Ok(Self::new(name, service, max_active))
    }
}

impl<B: TimerBackend> TaskScheduler for TimerScheduler<B> {
    fn alloc_slot(&self) -> Result<SlotId, SchedulerError> {
        let mut st = lock(&self.state);
        if st.destroyed {
            return Err(SchedulerError::Destroyed);
        }
        if st.slots.len() >= usize::from(st.max_active) {
            return Err(SchedulerError::NoFreeSlot);
        }

        let shared = Arc::new(SlotShared {
            task: Mutex::new(None),
            running: Mutex::new(None),
            idle: Condvar::new(),
        });
        let on_expiry = Arc::clone(&shared);
        let timer = st.backend.create(Box::new(move || on_expiry.fire()))?;

        let slot = SlotId(st.slots.len() as u8);
        st.slots.push(Slot { timer, shared });
        debug!("timer '{}': allocated slot {:?}", self.name, slot);
        Ok(slot)
    }

    fn schedule(
        &self,
        slot: SlotId,
        delay: Ticks,
        task: DeferredTask,
    ) -> Result<bool, SchedulerError> {
        let st = lock(&self.state);
        if st.destroyed {
            return Err(SchedulerError::Destroyed);
        }
        let Some(entry) = st.slots.get(usize::from(slot.0)) else {
            return Err(SchedulerError::UnknownSlot);
        };

        let mut parked = lock(&entry.shared.task);
        if parked.is_some() {
            return Ok(false);
        }
        // An expiry racing this arm blocks on `parked` until the task is in.
        B::arm(&entry.timer, delay.as_duration())?;
        *parked = Some(task);
        Ok(true)
    }

    fn flush_and_destroy(&self) {
        let slots = {
            let mut st = lock(&self.state);
            if st.destroyed {
                return;
            }
            st.destroyed = true;
            for slot in &st.slots {
                B::cancel(&slot.timer);
            }
            std::mem::take(&mut st.slots)
        };

        let flushed: Vec<DeferredTask> = slots.iter().filter_map(|s| s.shared.drain()).collect();
        debug!(
            "timer '{}': flushing {} queued task(s)",
            self.name,
            flushed.len()
        );
        for task in flushed {
            task();
        }

        drop(slots);
        info!("timer '{}': destroyed", self.name);
    }
}

impl<B: TimerBackend> Drop for TimerScheduler<B> {
    fn drop(&mut self) {
        self.flush_and_destroy();
    }
}

// ── ESP-IDF backend ───────────────────────────────────────────

#[cfg(target_os = "espidf")]
impl TimerBackend for esp_idf_svc::timer::EspTaskTimerService {
    type Timer = esp_idf_svc::timer::EspTimer<'static>;

    fn create(&self, callback: TimerCallback) -> Result<Self::Timer, SchedulerError> {
        self.timer(callback).map_err(|e| {
            log::error!("timer: esp_timer_create failed: {}", e);
            SchedulerError::NoFreeSlot
        })
    }

    fn arm(timer: &Self::Timer, delay: Duration) -> Result<(), SchedulerError> {
        timer.after(delay).map_err(|e| {
            log::error!("timer: esp_timer_start_once failed: {}", e);
            SchedulerError::ArmFailed
        })
    }

    fn cancel(timer: &Self::Timer) {
        if let Err(e) = timer.cancel() {
            log::warn!("timer: esp_timer_stop failed: {}", e);
        }
    }
}
