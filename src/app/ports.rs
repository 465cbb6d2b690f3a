//! Port traits — the boundary between the blink core and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ BlinkController (domain)
//! ```
//!
//! The GPIO bank, the schedulers, the node registry and the event sink all
//! implement these traits.  The [`BlinkController`](super::controller::BlinkController)
//! and the bring-up code in [`lifecycle`](crate::lifecycle) consume them via
//! generics, so the core never touches hardware or threads directly.

use embedded_hal::digital::OutputPin;

use super::events::BlinkEvent;
use super::interval::Ticks;

// ───────────────────────────────────────────────────────────────
// Pin driver (driven adapter: domain → GPIO)
// ───────────────────────────────────────────────────────────────

/// Hands out exclusive ownership of output lines.
///
/// A line is driven through [`OutputPin`]; the controller is the only writer
/// once it holds one.
pub trait PinDriver {
    type Line: OutputPin + Send + 'static;

    /// Validate `gpio` and claim it as an output driven LOW.
    fn acquire(&mut self, gpio: i32) -> Result<Self::Line, PinError>;

    /// Give the line back.  The caller has already driven it LOW.
    fn release(&mut self, line: Self::Line);
}

// ───────────────────────────────────────────────────────────────
// Deferred task scheduler (driven adapter: domain → worker)
// ───────────────────────────────────────────────────────────────

/// A one-shot callback run on the scheduler's worker.
pub type DeferredTask = Box<dyn FnOnce() + Send + 'static>;

/// A reserved callback slot.  At most one task is queued per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub u8);

/// Runs callbacks once after a delay, off the caller's context.
///
/// Tasks may call [`schedule`](TaskScheduler::schedule) on their own slot
/// while running; that is how a callback re-arms itself.
pub trait TaskScheduler: Send + Sync {
    /// Reserve a slot.  Fails when every slot is taken.
    fn alloc_slot(&self) -> Result<SlotId, SchedulerError>;

    /// Queue `task` on `slot` to run after `delay`.
    ///
    /// Returns `Ok(false)` and drops `task` if the slot already has a task
    /// queued.  Never blocks on a running task.
    fn schedule(&self, slot: SlotId, delay: Ticks, task: DeferredTask)
    -> Result<bool, SchedulerError>;

    /// Run every queued task now, wait for them, and stop the worker.
    /// Later `schedule` calls fail with [`SchedulerError::Destroyed`].
    fn flush_and_destroy(&self);
}

/// Shared schedulers: bring-up keeps one handle to destroy the worker while
/// the controller schedules through another.
impl<T: TaskScheduler + ?Sized> TaskScheduler for std::sync::Arc<T> {
    fn alloc_slot(&self) -> Result<SlotId, SchedulerError> {
        (**self).alloc_slot()
    }

    fn schedule(
        &self,
        slot: SlotId,
        delay: Ticks,
        task: DeferredTask,
    ) -> Result<bool, SchedulerError> {
        (**self).schedule(slot, delay, task)
    }

    fn flush_and_destroy(&self) {
        (**self).flush_and_destroy();
    }
}

// ───────────────────────────────────────────────────────────────
// Surface registry (device registration facade)
// ───────────────────────────────────────────────────────────────

/// Handle to a registered control-surface node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(pub u32);

/// Creates and removes the named node the control surface is reached by.
pub trait SurfaceRegistry {
    fn register(&mut self, class: &str, name: &str) -> Result<NodeHandle, RegistryError>;

    fn unregister(&mut self, node: NodeHandle);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The controller emits structured [`BlinkEvent`]s through this port.
///
/// Called with the controller's lock held: implementations must not call
/// back into the controller.
pub trait EventSink: Send {
    fn emit(&mut self, event: &BlinkEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`PinDriver::acquire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinError {
    /// No such output GPIO on this board.
    InvalidPin(i32),
    /// Another owner holds the line.
    Busy(i32),
    /// The GPIO peripheral refused the configuration.
    ConfigFailed(i32),
}

/// Errors from [`TaskScheduler`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    /// The worker thread could not be started.
    SpawnFailed,
    /// Every callback slot is taken.
    NoFreeSlot,
    /// The slot was never allocated on this scheduler.
    UnknownSlot,
    /// The scheduler has been flushed and destroyed.
    Destroyed,
    /// The platform timer refused to start.
    ArmFailed,
}

/// Errors from [`SurfaceRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// A node with that name already exists.
    NameTaken,
    /// The registry refused the node.
    Rejected,
}

impl core::fmt::Display for PinError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidPin(gpio) => write!(f, "gpio {} is not valid", gpio),
            Self::Busy(gpio) => write!(f, "gpio {} is already claimed", gpio),
            Self::ConfigFailed(gpio) => write!(f, "gpio {} config failed", gpio),
        }
    }
}

impl core::fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::SpawnFailed => write!(f, "worker spawn failed"),
            Self::NoFreeSlot => write!(f, "no free callback slot"),
            Self::UnknownSlot => write!(f, "unknown slot"),
            Self::Destroyed => write!(f, "scheduler destroyed"),
            Self::ArmFailed => write!(f, "timer arm failed"),
        }
    }
}

impl core::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NameTaken => write!(f, "name already registered"),
            Self::Rejected => write!(f, "registration rejected"),
        }
    }
}
