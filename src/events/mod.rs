//! Lifecycle events: data model, sink contract and broadcast transport.
//!
//! ## Contents
//! - [`ServiceState`], [`Event`] state classification and payload
//! - [`EventSink`], [`SinkRef`] the observer contract runners report into
//! - [`Bus`] optional `tokio::sync::broadcast` transport implementing [`EventSink`]

mod bus;
mod event;
mod sink;

pub use bus::Bus;
pub use event::{Event, ServiceState};
pub use sink::{EventSink, SinkRef};
