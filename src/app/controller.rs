//! Blink controller — the core state machine.
//!
//! [`BlinkController`] owns the blink state, the interval, the last written
//! pin level, the "task pending" flag and the output line, all behind one
//! mutex.  Control-surface writes and timer callbacks both take that lock,
//! so a write can never interleave with a callback's check-then-act.
//!
//! ```text
//!            start()                       on_timer_fire() while Running
//!  Stopped ──────────▶ Running ◀─────────┐ (toggle, re-arm, write level)
//!     ▲                  │   └───────────┘
//!     │      stop()      │
//!     └──────────────────┘  pending callback then observes Stopped,
//!                            drives LOW and does not re-arm
//! ```
//!
//! Re-arming is the callback re-submitting itself to the scheduler; the
//! controller only decides whether to.  A callback holds a `Weak` handle,
//! so a queued task never keeps a dropped controller alive.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use embedded_hal::digital::{OutputPin, PinState};
use log::{debug, error, info, warn};

use super::commands::BlinkCommand;
use super::events::BlinkEvent;
use super::interval::Interval;
use super::ports::{DeferredTask, EventSink, SlotId, TaskScheduler};
use crate::error::{Error, Resource, Result};

// ───────────────────────────────────────────────────────────────
// State
// ───────────────────────────────────────────────────────────────

/// Whether the re-arming chain is supposed to keep running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlinkState {
    Stopped,
    Running,
}

fn toggled(level: PinState) -> PinState {
    match level {
        PinState::Low => PinState::High,
        PinState::High => PinState::Low,
    }
}

/// Everything guarded by the controller lock.
struct Core<P, E> {
    state: BlinkState,
    /// Last level written to (or owed to) the line.
    level: PinState,
    interval: Interval,
    /// A callback is queued or running and has not yet taken the lock.
    pending: bool,
    /// `None` before bring-up attaches the line and after shutdown takes it.
    pin: Option<P>,
    sink: E,
}

impl<P: OutputPin, E: EventSink> Core<P, E> {
    fn write(&mut self, level: PinState) {
        self.level = level;
        if let Some(pin) = self.pin.as_mut() {
            if let Err(e) = pin.set_state(level) {
                warn!("pin write {:?} failed: {:?}", level, e);
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// BlinkController
// ───────────────────────────────────────────────────────────────

/// The blink state machine and its re-arming callback.
pub struct BlinkController<P, S, E> {
    core: Mutex<Core<P, E>>,
    scheduler: S,
    slot: SlotId,
}

impl<P, S, E> BlinkController<P, S, E>
where
    P: OutputPin + Send + 'static,
    S: TaskScheduler + 'static,
    E: EventSink + 'static,
{
    /// Build a stopped controller and reserve its callback slot.
    ///
    /// Fails with [`Resource::CallbackSlot`] when the scheduler has no free
    /// slot; the controller is never usable without one.
    pub fn new(scheduler: S, sink: E, interval: Interval) -> Result<Arc<Self>> {
        let slot = scheduler.alloc_slot().map_err(|e| {
            error!("controller: callback slot allocation failed: {}", e);
            Error::ResourceUnavailable(Resource::CallbackSlot)
        })?;
        debug!("controller: using slot {:?}, interval {} ms", slot, interval.as_millis());

        Ok(Arc::new(Self {
            core: Mutex::new(Core {
                state: BlinkState::Stopped,
                level: PinState::Low,
                interval,
                pending: false,
                pin: None,
                sink,
            }),
            scheduler,
            slot,
        }))
    }

    // ── Operations ────────────────────────────────────────────

    /// Start blinking.  A no-op while already Running.
    pub fn start(self: &Arc<Self>) -> Result<()> {
        let mut core = self.lock();
        self.start_locked(&mut core)
    }

    /// Stop blinking.  A no-op while already Stopped.
    pub fn stop(&self) {
        let mut core = self.lock();
        Self::stop_locked(&mut core);
    }

    /// Validate and store a new interval in milliseconds.
    pub fn set_interval(&self, ms: i64) -> Result<()> {
        let interval = Interval::from_millis(ms).inspect_err(|e| {
            warn!("controller: rejected interval: {}", e);
        })?;
        let mut core = self.lock();
        Self::set_interval_locked(&mut core, interval);
        Ok(())
    }

    /// Current interval in external milliseconds.
    pub fn get_interval_ms(&self) -> u32 {
        self.lock().interval.as_millis()
    }

    /// Decode a control-surface payload against the current state and
    /// apply it, all under one lock.
    pub fn apply(self: &Arc<Self>, payload: &str) -> Result<BlinkCommand> {
        let mut core = self.lock();
        let cmd = match BlinkCommand::parse(payload, core.state) {
            Ok(cmd) => cmd,
            Err(e) => {
                warn!(
                    "Invalid command {:?} ({}). Allowed commands are: 'on', 'off' or number ([50,1000])",
                    payload, e
                );
                core.sink.emit(&BlinkEvent::CommandRejected(e));
                return Err(e.into());
            }
        };

        match cmd {
            BlinkCommand::Start => self.start_locked(&mut core)?,
            BlinkCommand::Stop => Self::stop_locked(&mut core),
            BlinkCommand::SetInterval(interval) => Self::set_interval_locked(&mut core, interval),
        }
        Ok(cmd)
    }

    // ── Output ownership ──────────────────────────────────────

    /// Hand the controller its output line.  The line is driven to the
    /// current level (LOW unless a line is re-attached mid-blink).
    pub fn attach_pin(&self, line: P) {
        let mut core = self.lock();
        core.pin = Some(line);
        let level = core.level;
        core.write(level);
    }

    /// Stop, drive the line LOW and take it back for release.
    ///
    /// A callback that fires afterwards observes Stopped with no line and
    /// ends the chain without writing.
    pub fn release_pin(&self) -> Option<P> {
        let mut core = self.lock();
        Self::stop_locked(&mut core);
        core.write(PinState::Low);
        core.pin.take()
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> BlinkState {
        self.lock().state
    }

    /// Last level written to the line.
    pub fn pin_level(&self) -> PinState {
        self.lock().level
    }

    /// Whether a callback is queued and has not yet run.
    pub fn is_pending(&self) -> bool {
        self.lock().pending
    }

    pub fn interval(&self) -> Interval {
        self.lock().interval
    }

    // ── Timer callback ────────────────────────────────────────

    /// Runs on the scheduler's worker when the pending task comes due.
    ///
    /// The level is toggled first.  While Running the task re-arms before
    /// the toggled level is written; once Stopped the line is driven LOW and
    /// the chain ends.
    fn on_timer_fire(self: &Arc<Self>) {
        let mut core = self.lock();
        core.pending = false;
        let next = toggled(core.level);

        if core.state == BlinkState::Stopped {
            core.write(PinState::Low);
            core.sink.emit(&BlinkEvent::ChainEnded);
            debug!("controller: chain ended, pin LOW");
            return;
        }

        if self.arm(&mut core) {
            core.write(next);
            core.sink.emit(&BlinkEvent::Toggled(next));
        } else {
            core.state = BlinkState::Stopped;
            core.write(PinState::Low);
            core.sink.emit(&BlinkEvent::RearmFailed);
            error!("controller: re-arm failed, blinking stopped");
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn lock(&self) -> MutexGuard<'_, Core<P, E>> {
        // Every critical section leaves Core consistent before it can panic
        // (pin writes only log), so a poisoned lock is still usable.
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn start_locked(self: &Arc<Self>, core: &mut Core<P, E>) -> Result<()> {
        if core.state == BlinkState::Running {
            debug!("controller: start ignored, already running");
            return Ok(());
        }

        core.state = BlinkState::Running;
        // A callback still queued from before a stop() picks the chain back up.
        if !core.pending && !self.arm(core) {
            core.state = BlinkState::Stopped;
            return Err(Error::ResourceUnavailable(Resource::Scheduler));
        }
        core.sink.emit(&BlinkEvent::Started {
            interval_ms: core.interval.as_millis(),
        });
        info!("controller: blinking every {} ms", core.interval.as_millis());
        Ok(())
    }

    fn stop_locked(core: &mut Core<P, E>) {
        if core.state == BlinkState::Stopped {
            return;
        }
        core.state = BlinkState::Stopped;
        if !core.pending {
            core.write(PinState::Low);
        }
        core.sink.emit(&BlinkEvent::Stopped);
        info!("controller: stopped blinking");
    }

    fn set_interval_locked(core: &mut Core<P, E>, interval: Interval) {
        let from_ms = core.interval.as_millis();
        core.interval = interval;
        core.sink.emit(&BlinkEvent::IntervalChanged {
            from_ms,
            to_ms: interval.as_millis(),
        });
        info!("controller: interval {} -> {} ms", from_ms, interval.as_millis());
    }

    /// Queue the next callback after the current interval.
    fn arm(self: &Arc<Self>, core: &mut Core<P, E>) -> bool {
        let weak = Arc::downgrade(self);
        let task: DeferredTask = Box::new(move || {
            if let Some(controller) = weak.upgrade() {
                controller.on_timer_fire();
            }
        });

        let delay = core.interval.ticks();
        match self.scheduler.schedule(self.slot, delay, task) {
            Ok(queued) => {
                if !queued {
                    warn!("controller: slot {:?} already queued", self.slot);
                }
                core.pending = true;
                debug!("controller: queued callback in {} ticks", delay.0);
                true
            }
            Err(e) => {
                error!("controller: schedule failed: {}", e);
                false
            }
        }
    }
}
