//! # Event sink: where runners report lifecycle transitions.
//!
//! Runners call [`EventSink::on_event`] inline from `run`, so implementations must
//! return quickly (log and return, push into a channel). A sink that blocks
//! briefly only delays the runner; it never changes the order of events.
//!
//! Any `Fn(&Event) + Send + Sync` closure is a sink:
//! ```rust
//! use std::sync::Arc;
//! use svcvisor::{Event, SinkRef};
//!
//! let sink: SinkRef = Arc::new(|ev: &Event| {
//!     let _ = (ev.state, &ev.message);
//! });
//! # let _ = sink;
//! ```

use std::sync::Arc;

use super::event::Event;

/// Observer of lifecycle events.
pub trait EventSink: Send + Sync + 'static {
    /// Handles one event. Must not block for long.
    fn on_event(&self, event: &Event);
}

impl<F> EventSink for F
where
    F: Fn(&Event) + Send + Sync + 'static,
{
    fn on_event(&self, event: &Event) {
        self(event)
    }
}

/// Shared handle to an event sink.
pub type SinkRef = Arc<dyn EventSink>;
