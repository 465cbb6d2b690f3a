//! Adapters — concrete implementations of the port traits.
//!
//! | Adapter         | Implements        | Connects to               |
//! |-----------------|-------------------|---------------------------|
//! | `log_sink`      | EventSink         | Serial / stderr log       |
//! | `node_registry` | SurfaceRegistry   | In-memory node table      |
//! | `console`       | —                 | stdin/stdout line console |
//!
//! The GPIO bank ([`crate::drivers::gpio`]) and the work queue
//! ([`crate::scheduler`]) implement `PinDriver` and `TaskScheduler`.

pub mod console;
pub mod log_sink;
pub mod node_registry;
