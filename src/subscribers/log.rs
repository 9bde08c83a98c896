//! # LogWriter: lifecycle events as `tracing` records.
//!
//! A ready-made [`EventSink`] for init-style hosts that already install a
//! `tracing` subscriber. Failures log at `WARN`, everything else at `INFO`.
//!
//! ## Example output (with a fmt subscriber)
//! ```text
//! INFO svcvisor::events: Starting service service="ntpd" state=Preparing seq=0
//! INFO svcvisor::events: Process started with PID 412 service="ntpd" state=Running seq=1
//! WARN svcvisor::events: Service failed: exit code 1 service="ntpd" state=Failed seq=2
//! INFO svcvisor::events: Service failed: ...; restarting in 5s ... state=Waiting attempt=2 delay_ms=5000
//! ```

use tracing::{info, warn};

use crate::events::{Event, EventSink, ServiceState};

const EVENTS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::events");

/// Event sink writing to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogWriter {
    fn on_event(&self, e: &Event) {
        match e.state {
            ServiceState::Failed => warn!(
                target: EVENTS_TARGET,
                service = %e.service,
                state = %e.state,
                seq = e.seq,
                exit = ?e.exit,
                "{}",
                e.message
            ),
            ServiceState::Waiting => info!(
                target: EVENTS_TARGET,
                service = %e.service,
                state = %e.state,
                seq = e.seq,
                attempt = ?e.attempt,
                delay_ms = ?e.delay_ms,
                "{}",
                e.message
            ),
            _ => info!(
                target: EVENTS_TARGET,
                service = %e.service,
                state = %e.state,
                seq = e.seq,
                "{}",
                e.message
            ),
        }
    }
}
