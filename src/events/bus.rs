//! # Broadcast transport for lifecycle events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that implements
//! [`EventSink`], so a runner can report into it while any number of async
//! consumers read at their own pace.
//!
//! ```text
//! ProcessRunner ──┐
//!                 ├── on_event ──► Bus ──► receiver 1 (logging)
//! RestartRunner ──┘                   └──► receiver N (status page, tests)
//! ```
//!
//! ## Rules
//! - **Non-blocking**: publishing never waits for receivers.
//! - **Bounded**: one ring buffer of `capacity` events shared by all receivers.
//! - **Lagging receivers** get `RecvError::Lagged(n)` and skip the `n` oldest events.
//! - **No persistence**: events published with no receivers are dropped.

use tokio::sync::broadcast;

use super::event::Event;
use super::sink::EventSink;

/// Broadcast channel for lifecycle events.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus; `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all current receivers.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a receiver observing events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl EventSink for Bus {
    fn on_event(&self, event: &Event) {
        self.publish(event.clone());
    }
}
