//! # Lifecycle events reported by runners.
//!
//! An [`Event`] carries the [`ServiceState`] a service entered, the service id and
//! a formatted human-readable message, plus optional metadata set by the emitter.
//!
//! ## Ordering
//! Within one `run` call events follow
//! `Preparing → Running → [Stopping] → Finished | Failed | Stopped`.
//! The restart layer adds `Waiting` between attempts. Every event also carries a
//! process-wide monotonic `seq` for restoring order after async delivery.
//!
//! ## Example
//! ```rust
//! use svcvisor::{Event, ServiceState};
//!
//! let ev = Event::new(ServiceState::Waiting, "ntpd")
//!     .with_message(format!("restarting in {:?}", std::time::Duration::from_secs(5)))
//!     .with_attempt(2);
//!
//! assert_eq!(ev.state, ServiceState::Waiting);
//! assert_eq!(&*ev.service, "ntpd");
//! assert_eq!(ev.attempt, Some(2));
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::error::ExitKind;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// State a service has entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceState {
    /// `run` entered; the process is about to be launched.
    Preparing,
    /// The process has been launched.
    ///
    /// The message carries the pid.
    Running,
    /// A stop was requested; termination signals are being delivered.
    Stopping,
    /// The process exited successfully.
    Finished,
    /// The process could not be launched or exited unsuccessfully.
    ///
    /// Sets: `exit` (when the process ran).
    Failed,
    /// The process was terminated on request.
    Stopped,
    /// The restart layer is sleeping before the next attempt.
    ///
    /// Sets: `attempt` (next attempt number), `delay_ms`.
    Waiting,
}

impl ServiceState {
    /// Stable display name.
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceState::Preparing => "Preparing",
            ServiceState::Running => "Running",
            ServiceState::Stopping => "Stopping",
            ServiceState::Finished => "Finished",
            ServiceState::Failed => "Failed",
            ServiceState::Stopped => "Stopped",
            ServiceState::Waiting => "Waiting",
        }
    }

    /// Whether this state ends a single `run` of a process runner.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ServiceState::Finished | ServiceState::Failed | ServiceState::Stopped
        )
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Service identifier.
    pub service: Arc<str>,
    /// State entered.
    pub state: ServiceState,
    /// Human-readable message.
    pub message: Arc<str>,
    /// Attempt number (restart layer, starting from 1).
    pub attempt: Option<u32>,
    /// Delay before the next attempt in milliseconds.
    pub delay_ms: Option<u32>,
    /// How the process ended, for failures.
    pub exit: Option<ExitKind>,
}

impl Event {
    /// Creates an event with the current timestamp and next sequence number.
    pub fn new(state: ServiceState, service: impl Into<Arc<str>>) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            service: service.into(),
            state,
            message: Arc::from(""),
            attempt: None,
            delay_ms: None,
            exit: None,
        }
    }

    /// Attaches the formatted message.
    #[inline]
    pub fn with_message(mut self, message: impl Into<Arc<str>>) -> Self {
        self.message = message.into();
        self
    }

    /// Attaches an attempt number.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a delay (stored as milliseconds, saturating).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(u32::try_from(d.as_millis()).unwrap_or(u32::MAX));
        self
    }

    /// Attaches process exit details.
    #[inline]
    pub fn with_exit(mut self, kind: ExitKind) -> Self {
        self.exit = Some(kind);
        self
    }
}
