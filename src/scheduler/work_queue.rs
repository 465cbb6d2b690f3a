//! Thread-backed deferred-task queue (host scheduler).
//!
//! A single named worker thread runs one-shot callbacks after a delay in
//! 10 ms ticks.  Callers reserve slots up front; each slot carries at most
//! one queued task, and queueing onto a busy slot is a no-op.  A running
//! task may queue itself again, which is how the blink chain re-arms.
//!
//! ```text
//!  schedule(slot, ticks, task) ──▶ ┌──────────────────┐
//!                                  │ pending (by slot)│──▶ worker: wait for the
//!  flush_and_destroy() ──────────▶ └──────────────────┘    earliest deadline, run
//! ```
//!
//! The queue lock is never held while a task runs, so tasks are free to
//! take their own locks and call [`WorkQueue::schedule`] again.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use log::{debug, error, info, warn};

use crate::app::interval::Ticks;
use crate::app::ports::{DeferredTask, SchedulerError, SlotId, TaskScheduler};
use crate::drivers::task_pin::{self, Core};

/// Worker priority on ESP-IDF (FreeRTOS scale).
const WORKER_PRIORITY: u8 = 5;
/// Worker stack.  Callbacks only lock, write a GPIO and log.
const WORKER_STACK_KB: usize = 32;

struct Pending {
    slot: SlotId,
    deadline: Instant,
    task: DeferredTask,
}

struct QueueState {
    max_active: u8,
    allocated: u8,
    pending: Vec<Pending>,
    destroyed: bool,
}

impl QueueState {
    /// Index of the task due first.
    fn earliest(&self) -> Option<usize> {
        self.pending
            .iter()
            .enumerate()
            .min_by_key(|(_, p)| p.deadline)
            .map(|(i, _)| i)
    }
}

struct Shared {
    state: Mutex<QueueState>,
    wake: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Thread-backed [`TaskScheduler`].
pub struct WorkQueue {
    name: String,
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl WorkQueue {
    /// Start the worker thread with `max_active` callback slots.
    pub fn start(name: &str, max_active: u8) -> Result<Self, SchedulerError> {
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                max_active,
                allocated: 0,
                pending: Vec::with_capacity(usize::from(max_active)),
                destroyed: false,
            }),
            wake: Condvar::new(),
        });

        let worker_shared = Arc::clone(&shared);
        let handle = task_pin::spawn_on_core(
            Core::App,
            WORKER_PRIORITY,
            WORKER_STACK_KB,
            name,
            move || run_worker(&worker_shared),
        )
        .map_err(|e| {
            error!("workqueue '{}': spawn failed: {}", name, e);
            SchedulerError::SpawnFailed
        })?;

        info!("workqueue '{}': started ({} slots)", name, max_active);
        Ok(Self {
            name: name.into(),
            shared,
            worker: Mutex::new(Some(handle)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of tasks currently queued.
    pub fn queued(&self) -> usize {
        self.shared.lock().pending.len()
    }
}

impl TaskScheduler for WorkQueue {
    fn alloc_slot(&self) -> Result<SlotId, SchedulerError> {
        let mut q = self.shared.lock();
        if q.destroyed {
            return Err(SchedulerError::Destroyed);
        }
        if q.allocated >= q.max_active {
            return Err(SchedulerError::NoFreeSlot);
        }
        let slot = SlotId(q.allocated);
        q.allocated += 1;
        Ok(slot)
    }

    fn schedule(
        &self,
        slot: SlotId,
        delay: Ticks,
        task: DeferredTask,
    ) -> Result<bool, SchedulerError> {
        let mut q = self.shared.lock();
        if q.destroyed {
            return Err(SchedulerError::Destroyed);
        }
        if slot.0 >= q.allocated {
            return Err(SchedulerError::UnknownSlot);
        }
        if q.pending.iter().any(|p| p.slot == slot) {
            return Ok(false);
        }

        q.pending.push(Pending {
            slot,
            deadline: Instant::now() + delay.as_duration(),
            task,
        });
        self.shared.wake.notify_one();
        Ok(true)
    }

    fn flush_and_destroy(&self) {
        {
            let mut q = self.shared.lock();
            if !q.destroyed {
                q.destroyed = true;
                debug!(
                    "workqueue '{}': flushing {} queued task(s)",
                    self.name,
                    q.pending.len()
                );
            }
            self.shared.wake.notify_all();
        }

        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(handle) = handle else {
            return;
        };
        if handle.thread().id() == thread::current().id() {
            // Destroyed from one of our own tasks: the loop exits on its own.
            return;
        }
        if handle.join().is_err() {
            warn!("workqueue '{}': worker panicked", self.name);
        }
        info!("workqueue '{}': destroyed", self.name);
    }
}

impl Drop for WorkQueue {
    fn drop(&mut self) {
        self.flush_and_destroy();
    }
}

fn run_worker(shared: &Shared) {
    let mut q = shared.lock();
    loop {
        let Some(next) = q.earliest() else {
            if q.destroyed {
                return;
            }
            q = shared.wake.wait(q).unwrap_or_else(PoisonError::into_inner);
            continue;
        };

        let now = Instant::now();
        let deadline = q.pending[next].deadline;
        if q.destroyed || deadline <= now {
            let due = q.pending.swap_remove(next);
            drop(q);
            (due.task)();
            q = shared.lock();
        } else {
            q = shared
                .wake
                .wait_timeout(q, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}
