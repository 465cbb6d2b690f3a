//! Unified error types for the blink controller.
//!
//! A single `Error` enum that every subsystem converts into, so the
//! bring-up path and the control surface report failures uniformly.
//! All variants are `Copy` so they can cross the worker/caller boundary
//! and be stored in events without allocation.

use core::fmt;

use crate::app::ports::{PinError, RegistryError, SchedulerError};

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A resource needed at bring-up could not be acquired.  Fatal.
    ResourceUnavailable(Resource),
    /// A control-surface write was rejected.  No state was changed.
    InvalidCommand(CommandError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResourceUnavailable(r) => write!(f, "resource unavailable: {r}"),
            Self::InvalidCommand(e) => write!(f, "invalid command: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Bring-up resources
// ---------------------------------------------------------------------------

/// The resources acquired at bring-up, in acquisition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// The deferred task worker.
    Scheduler,
    /// The single callback slot on the worker.
    CallbackSlot,
    /// The registered control-surface node.
    ControlSurface,
    /// The output GPIO.
    Pin,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheduler => write!(f, "scheduler"),
            Self::CallbackSlot => write!(f, "callback slot"),
            Self::ControlSurface => write!(f, "control surface"),
            Self::Pin => write!(f, "pin"),
        }
    }
}

impl From<PinError> for Error {
    fn from(_: PinError) -> Self {
        Self::ResourceUnavailable(Resource::Pin)
    }
}

impl From<RegistryError> for Error {
    fn from(_: RegistryError) -> Self {
        Self::ResourceUnavailable(Resource::ControlSurface)
    }
}

impl From<SchedulerError> for Error {
    fn from(e: SchedulerError) -> Self {
        match e {
            SchedulerError::NoFreeSlot => Self::ResourceUnavailable(Resource::CallbackSlot),
            _ => Self::ResourceUnavailable(Resource::Scheduler),
        }
    }
}

// ---------------------------------------------------------------------------
// Command errors
// ---------------------------------------------------------------------------

/// Why a control-surface write was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Nothing was written.
    Empty,
    /// Not `on`/`off` in the current state, and not a base-10 integer.
    NotANumber,
    /// A number outside [50, 1000] milliseconds.
    OutOfRange(i64),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty payload"),
            Self::NotANumber => write!(f, "not 'on', 'off' or a number"),
            Self::OutOfRange(ms) => write!(f, "{ms} ms outside [50,1000]"),
        }
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::InvalidCommand(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
