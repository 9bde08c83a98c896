//! # svcvisor
//!
//! **svcvisor** supervises a single external service process for a minimal init
//! layer: it launches the process, streams its combined output into a per-service
//! log file, reports lifecycle transitions to an event sink, and stops it with
//! SIGTERM, escalating to SIGKILL after a grace period. A restart wrapper re-runs
//! the service according to a policy, and stays stoppable at any point.
//!
//! ## Architecture
//! ```text
//!            caller task                         other task / token
//!                 │                                      │
//!     open ─► run(sink) ─► close                    stop() / cancel()
//!                 │                                      │
//! ┌───────────────▼──────────────────────────────────────▼───────────┐
//! │ RestartRunner<R>   (optional)                                    │
//! │   loop: attempt ─► policy ─► Waiting ─► sleep (wakes on stop)    │
//! └───────────────┬──────────────────────────────────────────────────┘
//!                 │ Runner::run / Runner::stop (forwarded to live attempt)
//! ┌───────────────▼──────────────────────────────────────────────────┐
//! │ ProcessRunner                                                    │
//! │   spawn (own process group) ─► capture stdout+stderr ─► <id>.log │
//! │   select { exit | stop | token } ─► SIGTERM ─► timer ─► SIGKILL  │
//! └───────────────┬──────────────────────────────────────────────────┘
//!                 ▼
//!        EventSink::on_event(&Event)   (closure, Bus, LogWriter, ...)
//! ```
//!
//! ### Event order within one process run
//! ```text
//! Preparing ─► Running ─► [Stopping] ─► Finished | Failed | Stopped
//! ```
//! The restart wrapper adds `Waiting` between attempts.
//!
//! ## Features
//! | Area              | Description                                               | Key types                              |
//! |-------------------|-----------------------------------------------------------|----------------------------------------|
//! | **Runners**       | Open / run / stop / close capability, composable.         | [`Runner`], [`RunnerRef`]              |
//! | **Process**       | One child process, log capture, graceful/forced stop.     | [`ProcessRunner`]                      |
//! | **Restart**       | Never / until-success / forever with stoppable delays.    | [`RestartRunner`], [`RestartPolicy`]   |
//! | **Events**        | Lifecycle states delivered to a caller-supplied sink.     | [`Event`], [`EventSink`], [`Bus`]      |
//! | **Errors**        | I/O, launch and exit failures; stop is not an error.      | [`RunnerError`], [`ExitKind`]          |
//! | **Configuration** | Explicit per-runner settings, no globals.                 | [`Args`], [`RunnerConfig`]             |
//!
//! ## Optional features
//! - `logging` (default): exports [`LogWriter`], an [`EventSink`] that writes to `tracing`.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use svcvisor::{Args, Bus, ProcessRunner, RestartPolicy, RestartRunner, Runner, RunnerConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = RunnerConfig::default()
//!         .with_log_path("/var/log")
//!         .with_graceful_shutdown_timeout(Duration::from_secs(5))
//!         .with_restart(RestartPolicy::Forever)
//!         .with_restart_interval(Duration::from_secs(1));
//!
//!     let svc = Arc::new(RestartRunner::with_config(
//!         ProcessRunner::new(Args::new("sshd", ["/usr/sbin/sshd", "-D"]), cfg.clone()),
//!         &cfg,
//!     ));
//!
//!     let bus = Bus::new(64);
//!     let mut events = bus.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(ev) = events.recv().await {
//!             println!("[{}] {}: {}", ev.service, ev.state, ev.message);
//!         }
//!     });
//!
//!     let shutdown = CancellationToken::new();
//!     svc.open(shutdown.clone()).await?;
//!     let run = tokio::spawn({
//!         let svc = svc.clone();
//!         async move { svc.run(Arc::new(bus)).await }
//!     });
//!
//!     tokio::signal::ctrl_c().await?;
//!     shutdown.cancel();
//!     run.await??;
//!     svc.close().await?;
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod events;
mod policies;
mod process;
mod restart;
mod runners;
mod subscribers;

// ---- Public re-exports ----

pub use config::{Args, RunnerConfig};
pub use error::{ExitKind, Result, RunnerError};
pub use events::{Bus, Event, EventSink, ServiceState, SinkRef};
pub use policies::{BackoffPolicy, JitterPolicy, RestartPolicy};
pub use process::ProcessRunner;
pub use restart::RestartRunner;
pub use runners::{Runner, RunnerRef};

#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
