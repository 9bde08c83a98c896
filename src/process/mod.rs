//! Single-process runner and its building blocks.
//!
//! - [`ProcessRunner`] the [`Runner`](crate::Runner) that owns one child process per `run`
//! - `log` append-only `<id>.log` file shared by every attempt
//! - `spawn` process launch in a fresh process group
//! - `capture` stdout/stderr → log file copy tasks
//! - `terminate` SIGTERM → timer → SIGKILL state machine
//!
//! Unix only: process groups and signals come from `nix`.

mod capture;
mod log;
mod runner;
mod spawn;
mod terminate;

pub use runner::ProcessRunner;

/// `tracing` target for process diagnostics.
pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
