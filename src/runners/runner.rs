//! # Runner capability.
//!
//! A [`Runner`] is opened once, run (blocking until the managed unit is finished or
//! stopped), optionally stopped from elsewhere, and closed once. Both the
//! single-process runner and the restart wrapper implement it, so wrappers compose:
//!
//! ```text
//! RestartRunner<ProcessRunner>         // restart a process
//! RestartRunner<MyHealthGate<...>>     // any future decorator slots in the same way
//! ```
//!
//! All methods take `&self`: share the runner as `Arc<…>` and call
//! [`stop`](Runner::stop) or [`close`](Runner::close) from another task while
//! [`run`](Runner::run) is awaited.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::events::SinkRef;

/// # Open / run / stop / close capability.
///
/// ## Contract
/// - `open` and `close` are called at most once each; `close` after `open` releases
///   everything even if `run` never ran or failed.
/// - `close` may be called while `run` is in flight. It ends that `run` like a stop
///   but does not wait for it; await the `run` task to know the unit is gone.
/// - `run` reports transitions to `sink` and returns when the unit is permanently
///   done. Ending because of a stop request is `Ok(())`.
/// - `stop` never blocks and is sticky: it ends the in-flight `run`, and every `run`
///   started afterwards returns `Ok(())` without launching anything. A `run` that has
///   already returned is unaffected.
/// - Cancelling the token passed to `open` is equivalent to `stop`.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use svcvisor::{Event, Result, Runner, ServiceState, SinkRef};
///
/// struct Noop;
///
/// #[async_trait]
/// impl Runner for Noop {
///     fn id(&self) -> &str { "noop" }
///     async fn open(&self, _token: CancellationToken) -> Result<()> { Ok(()) }
///     async fn run(&self, sink: SinkRef) -> Result<()> {
///         sink.on_event(&Event::new(ServiceState::Finished, self.id()));
///         Ok(())
///     }
///     fn stop(&self) -> Result<()> { Ok(()) }
///     async fn close(&self) -> Result<()> { Ok(()) }
/// }
/// ```
#[async_trait]
pub trait Runner: Send + Sync + 'static {
    /// Service identifier used in events.
    fn id(&self) -> &str;

    /// Acquires resources; `token` is an extra stop channel for the runner's lifetime.
    async fn open(&self, token: CancellationToken) -> Result<()>;

    /// Runs the unit to completion, reporting lifecycle events to `sink`.
    async fn run(&self, sink: SinkRef) -> Result<()>;

    /// Requests early termination of the in-flight `run` and of any later one.
    fn stop(&self) -> Result<()>;

    /// Releases resources acquired by `open`; does not wait for an in-flight `run`.
    async fn close(&self) -> Result<()>;
}

/// Shared handle to a runner.
pub type RunnerRef = Arc<dyn Runner>;

#[async_trait]
impl<R: Runner + ?Sized> Runner for Arc<R> {
    fn id(&self) -> &str {
        (**self).id()
    }

    async fn open(&self, token: CancellationToken) -> Result<()> {
        (**self).open(token).await
    }

    async fn run(&self, sink: SinkRef) -> Result<()> {
        (**self).run(sink).await
    }

    fn stop(&self) -> Result<()> {
        (**self).stop()
    }

    async fn close(&self) -> Result<()> {
        (**self).close().await
    }
}
