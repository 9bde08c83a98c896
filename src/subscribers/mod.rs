//! Built-in event sinks.
//!
//! - [`LogWriter`]: renders lifecycle events through `tracing` (feature `logging`).

#[cfg(feature = "logging")]
mod log;

#[cfg(feature = "logging")]
pub use log::LogWriter;
