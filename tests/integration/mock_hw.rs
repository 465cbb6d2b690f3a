//! Mock adapters for integration tests.
//!
//! Records every pin write and every bring-up/shutdown step so tests can
//! assert on the full history without real GPIOs or worker threads.  The
//! [`ManualScheduler`] never runs anything on its own: tests fire queued
//! callbacks explicitly, which makes every interleaving deterministic.

#![allow(dead_code)]

use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use blinkctl::app::control::ControlSurface;
use blinkctl::app::controller::BlinkController;
use blinkctl::app::events::BlinkEvent;
use blinkctl::app::interval::{Interval, Ticks};
use blinkctl::app::ports::{
    DeferredTask, EventSink, NodeHandle, PinDriver, PinError, RegistryError, SchedulerError,
    SlotId, SurfaceRegistry, TaskScheduler,
};
use blinkctl::pins;
use embedded_hal::digital::{ErrorType, OutputPin, PinState};

// ── Journal of lifecycle steps ────────────────────────────────

/// Shared, ordered record of bring-up/shutdown steps across all mocks.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, step: impl Into<String>) {
        self.0.lock().unwrap().push(step.into());
    }

    pub fn steps(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

// ── Recording pin ─────────────────────────────────────────────

/// Output line that records every level written to it.
pub struct RecordingLine {
    pub gpio: i32,
    writes: Arc<Mutex<Vec<PinState>>>,
    journal: Journal,
}

impl ErrorType for RecordingLine {
    type Error = Infallible;
}

impl OutputPin for RecordingLine {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.writes.lock().unwrap().push(PinState::Low);
        self.journal.push("pin.low");
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.writes.lock().unwrap().push(PinState::High);
        self.journal.push("pin.high");
        Ok(())
    }
}

/// Pin driver handing out [`RecordingLine`]s.
pub struct MockPins {
    writes: Arc<Mutex<Vec<PinState>>>,
    journal: Journal,
    pub fail_with: Option<PinError>,
    pub released: Vec<i32>,
}

impl MockPins {
    pub fn new(journal: Journal) -> Self {
        Self {
            writes: Arc::new(Mutex::new(Vec::new())),
            journal,
            fail_with: None,
            released: Vec::new(),
        }
    }

    pub fn failing(journal: Journal, err: PinError) -> Self {
        Self {
            fail_with: Some(err),
            ..Self::new(journal)
        }
    }

    /// A line not owned by any driver, for controller-only tests.
    pub fn line(&self, gpio: i32) -> RecordingLine {
        RecordingLine {
            gpio,
            writes: Arc::clone(&self.writes),
            journal: self.journal.clone(),
        }
    }

    /// Every level written so far, oldest first.
    pub fn writes(&self) -> Vec<PinState> {
        self.writes.lock().unwrap().clone()
    }

    pub fn last_write(&self) -> Option<PinState> {
        self.writes.lock().unwrap().last().copied()
    }

    /// Handle to the write log that survives moving the driver.
    pub fn write_log(&self) -> Arc<Mutex<Vec<PinState>>> {
        Arc::clone(&self.writes)
    }
}

impl PinDriver for MockPins {
    type Line = RecordingLine;

    fn acquire(&mut self, gpio: i32) -> Result<RecordingLine, PinError> {
        self.journal.push("pin.acquire");
        if let Some(err) = self.fail_with {
            return Err(err);
        }
        if !pins::is_valid_output(gpio) {
            return Err(PinError::InvalidPin(gpio));
        }
        Ok(self.line(gpio))
    }

    fn release(&mut self, line: RecordingLine) {
        self.journal.push("pin.release");
        self.released.push(line.gpio);
    }
}

// ── Manual scheduler ──────────────────────────────────────────

struct Queued {
    slot: SlotId,
    delay: Ticks,
    task: DeferredTask,
}

struct ManualState {
    max_slots: u8,
    allocated: u8,
    queued: Vec<Queued>,
    history: Vec<Ticks>,
    destroyed: bool,
}

/// Scheduler whose tasks only run when the test fires them.
pub struct ManualScheduler {
    state: Mutex<ManualState>,
    journal: Journal,
}

impl ManualScheduler {
    pub fn new(journal: Journal) -> Self {
        Self::with_slots(journal, 4)
    }

    pub fn with_slots(journal: Journal, max_slots: u8) -> Self {
        Self {
            state: Mutex::new(ManualState {
                max_slots,
                allocated: 0,
                queued: Vec::new(),
                history: Vec::new(),
                destroyed: false,
            }),
            journal,
        }
    }

    /// Tasks queued and not yet fired.
    pub fn pending(&self) -> usize {
        self.state.lock().unwrap().queued.len()
    }

    /// Delay of the task that would fire next.
    pub fn next_delay(&self) -> Option<Ticks> {
        self.state.lock().unwrap().queued.first().map(|q| q.delay)
    }

    /// Delays of every task ever queued, oldest first.
    pub fn history(&self) -> Vec<Ticks> {
        self.state.lock().unwrap().history.clone()
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.lock().unwrap().destroyed
    }

    /// Run the oldest queued task.  Returns `false` if nothing was queued.
    pub fn fire_next(&self) -> bool {
        let next = {
            let mut st = self.state.lock().unwrap();
            if st.queued.is_empty() {
                return false;
            }
            st.queued.remove(0)
        };
        (next.task)();
        true
    }

    /// Fire up to `max` tasks, including ones queued by fired tasks.
    pub fn fire_up_to(&self, max: usize) -> usize {
        let mut fired = 0;
        while fired < max && self.fire_next() {
            fired += 1;
        }
        fired
    }
}

impl TaskScheduler for ManualScheduler {
    fn alloc_slot(&self) -> Result<SlotId, SchedulerError> {
        self.journal.push("scheduler.alloc_slot");
        let mut st = self.state.lock().unwrap();
        if st.allocated >= st.max_slots {
            return Err(SchedulerError::NoFreeSlot);
        }
        st.allocated += 1;
        Ok(SlotId(st.allocated - 1))
    }

    fn schedule(
        &self,
        slot: SlotId,
        delay: Ticks,
        task: DeferredTask,
    ) -> Result<bool, SchedulerError> {
        let mut st = self.state.lock().unwrap();
        if st.destroyed {
            return Err(SchedulerError::Destroyed);
        }
        if st.queued.iter().any(|q| q.slot == slot) {
            return Ok(false);
        }
        st.history.push(delay);
        st.queued.push(Queued { slot, delay, task });
        Ok(true)
    }

    fn flush_and_destroy(&self) {
        self.journal.push("scheduler.destroy");
        let drained: Vec<Queued> = {
            let mut st = self.state.lock().unwrap();
            st.destroyed = true;
            st.queued.drain(..).collect()
        };
        for q in drained {
            (q.task)();
        }
    }
}

// ── Registry ──────────────────────────────────────────────────

pub struct MockRegistry {
    journal: Journal,
    pub fail_with: Option<RegistryError>,
    pub registered: Vec<(NodeHandle, String)>,
    next: u32,
}

impl MockRegistry {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            fail_with: None,
            registered: Vec::new(),
            next: 0,
        }
    }

    pub fn failing(journal: Journal, err: RegistryError) -> Self {
        Self {
            fail_with: Some(err),
            ..Self::new(journal)
        }
    }
}

impl SurfaceRegistry for MockRegistry {
    fn register(&mut self, class: &str, name: &str) -> Result<NodeHandle, RegistryError> {
        self.journal.push("registry.register");
        if let Some(err) = self.fail_with {
            return Err(err);
        }
        let handle = NodeHandle(self.next);
        self.next += 1;
        self.registered.push((handle, format!("{}/{}", class, name)));
        Ok(handle)
    }

    fn unregister(&mut self, node: NodeHandle) {
        self.journal.push("registry.unregister");
        self.registered.retain(|(h, _)| *h != node);
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<BlinkEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BlinkEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&BlinkEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &BlinkEvent) {
        self.events.lock().unwrap().push(*event);
    }
}

// ── Fixture ───────────────────────────────────────────────────

pub type TestController = BlinkController<RecordingLine, Arc<ManualScheduler>, RecordingSink>;
pub type TestSurface = ControlSurface<RecordingLine, Arc<ManualScheduler>, RecordingSink>;

/// A stopped controller with a recording line attached.
pub struct Rig {
    pub controller: Arc<TestController>,
    pub scheduler: Arc<ManualScheduler>,
    pub pins: MockPins,
    pub sink: RecordingSink,
}

impl Rig {
    pub fn new() -> Self {
        let journal = Journal::new();
        let scheduler = Arc::new(ManualScheduler::new(journal.clone()));
        let sink = RecordingSink::new();
        let controller =
            TestController::new(Arc::clone(&scheduler), sink.clone(), Interval::DEFAULT).unwrap();
        let pins = MockPins::new(journal);
        controller.attach_pin(pins.line(26));
        Self {
            controller,
            scheduler,
            pins,
            sink,
        }
    }

    pub fn surface(&self) -> TestSurface {
        ControlSurface::new(Arc::clone(&self.controller))
    }
}
