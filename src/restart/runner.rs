//! # RestartRunner: re-runs a wrapped runner according to a policy.
//!
//! ## Loop
//! ```text
//! run(sink)
//! loop {
//!   ├─► stop requested / token cancelled? ─► Ok
//!   ├─► attempt += 1, mark attempt live
//!   ├─► inner.run(sink) ─► result
//!   ├─► mark attempt finished
//!   ├─► RestartPolicy
//!   │     ├─ Never                         ─► return result
//!   │     ├─ stop requested meanwhile      ─► Ok
//!   │     ├─ UntilSuccess && Ok            ─► Ok
//!   │     └─ otherwise                     ─► Waiting{delay, next attempt}
//!   └─► sleep(delay) ── stop / token ─► Ok
//! }
//! ```
//!
//! ## Rules
//! - Attempts run **sequentially**, never overlapping.
//! - The stop flag and the "attempt live" flag change under one lock, so a `stop`
//!   either prevents the next attempt or is forwarded to the live one. It is never lost.
//! - The inter-attempt sleep is woken by `stop`/`close` or by the open token.
//! - `close` counts as a stop: an in-flight `run` finishes its attempt and returns `Ok`.
//! - Only `Ok`/`Err` of an attempt is inspected, never the error itself.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::RunnerConfig;
use crate::error::{Result, RunnerError};
use crate::events::{Event, ServiceState, SinkRef};
use crate::policies::{BackoffPolicy, RestartPolicy};
use crate::runners::Runner;

const RESTART_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::restart");

#[derive(Default)]
struct RestartState {
    /// Token handed to `open`; `None` until opened.
    token: Option<CancellationToken>,
    stop_requested: bool,
    attempt_live: bool,
}

/// Decorates any [`Runner`] with a restart policy.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
/// use svcvisor::{
///     Args, Event, ProcessRunner, RestartPolicy, RestartRunner, Runner, RunnerConfig, SinkRef,
/// };
///
/// # async fn demo() -> svcvisor::Result<()> {
/// let cfg = RunnerConfig::default()
///     .with_log_path("/tmp")
///     .with_restart(RestartPolicy::UntilSuccess)
///     .with_restart_interval(Duration::from_millis(500));
/// let svc = Arc::new(RestartRunner::with_config(
///     ProcessRunner::new(Args::new("dhcp", ["/sbin/udhcpc", "-f"]), cfg.clone()),
///     &cfg,
/// ));
/// let sink: SinkRef = Arc::new(|ev: &Event| println!("{} {}", ev.state, ev.message));
///
/// svc.open(CancellationToken::new()).await?;
/// let handle = tokio::spawn({
///     let svc = svc.clone();
///     async move { svc.run(sink).await }
/// });
/// // ... later, from anywhere:
/// svc.stop()?;
/// handle.await.expect("run task panicked")?;
/// svc.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct RestartRunner<R: Runner> {
    inner: R,
    restart: RestartPolicy,
    backoff: BackoffPolicy,
    state: Mutex<RestartState>,
    /// Cancelled by `stop`; wakes the inter-attempt sleep.
    wake: CancellationToken,
}

impl<R: Runner> RestartRunner<R> {
    /// Wraps `inner` with an explicit policy and backoff.
    pub fn new(inner: R, restart: RestartPolicy, backoff: BackoffPolicy) -> Self {
        Self {
            inner,
            restart,
            backoff,
            state: Mutex::new(RestartState::default()),
            wake: CancellationToken::new(),
        }
    }

    /// Wraps `inner` with a constant `interval` between attempts.
    pub fn with_interval(inner: R, restart: RestartPolicy, interval: Duration) -> Self {
        Self::new(inner, restart, BackoffPolicy::constant(interval))
    }

    /// Wraps `inner` taking `restart` and `restart_interval` from `cfg`.
    pub fn with_config(inner: R, cfg: &RunnerConfig) -> Self {
        Self::new(inner, cfg.restart, cfg.backoff())
    }

    /// The wrapped runner.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Restart policy.
    pub fn restart(&self) -> RestartPolicy {
        self.restart
    }

    /// Delay policy.
    pub fn backoff(&self) -> BackoffPolicy {
        self.backoff
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RestartState> {
        self.state.lock().unwrap_or_else(|poison| poison.into_inner())
    }

    fn is_stopping(state: &RestartState) -> bool {
        state.stop_requested || state.token.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    /// Marks an attempt live unless a stop is pending; returns `false` when stopping.
    fn begin_attempt(&self) -> bool {
        let mut state = self.lock();
        if Self::is_stopping(&state) {
            return false;
        }
        state.attempt_live = true;
        true
    }

    /// Marks the attempt finished; returns whether a stop arrived meanwhile.
    fn end_attempt(&self) -> bool {
        let mut state = self.lock();
        state.attempt_live = false;
        Self::is_stopping(&state)
    }

    /// Sleeps `delay`; returns `false` if woken by a stop.
    async fn pause(&self, delay: Duration, token: &CancellationToken) -> bool {
        select! {
            _ = time::sleep(delay) => true,
            _ = self.wake.cancelled() => false,
            _ = token.cancelled() => false,
        }
    }
}

#[async_trait]
impl<R: Runner> Runner for RestartRunner<R> {
    fn id(&self) -> &str {
        self.inner.id()
    }

    async fn open(&self, token: CancellationToken) -> Result<()> {
        self.inner.open(token.clone()).await?;
        self.lock().token = Some(token);
        Ok(())
    }

    async fn run(&self, sink: SinkRef) -> Result<()> {
        let Some(token) = self.lock().token.clone() else {
            return Err(RunnerError::NotOpened {
                id: self.id().to_owned(),
            });
        };

        let mut attempt: u32 = 0;
        let mut failures: u32 = 0;

        loop {
            if !self.begin_attempt() {
                debug!(target: RESTART_TARGET, id = self.id(), attempt, "stop requested; not starting");
                return Ok(());
            }
            attempt = attempt.saturating_add(1);

            let res = self.inner.run(sink.clone()).await;
            let stopping = self.end_attempt();

            if self.restart == RestartPolicy::Never {
                return res;
            }
            if stopping {
                return Ok(());
            }
            if !self.restart.should_restart(res.is_ok()) {
                return res;
            }

            let reason = match &res {
                Ok(()) => {
                    failures = 0;
                    "Service exited".to_owned()
                }
                Err(err) => {
                    failures = failures.saturating_add(1);
                    format!("Service failed: {err}")
                }
            };
            let delay = self.backoff.next(failures.saturating_sub(1));
            let next = attempt.saturating_add(1);

            sink.on_event(
                &Event::new(ServiceState::Waiting, self.id())
                    .with_message(format!(
                        "{reason}; restarting in {delay:?} (policy {}, attempt {next})",
                        self.restart.as_str()
                    ))
                    .with_attempt(next)
                    .with_delay(delay),
            );

            if !self.pause(delay, &token).await {
                debug!(target: RESTART_TARGET, id = self.id(), attempt, "stop requested during restart delay");
                return Ok(());
            }
        }
    }

    fn stop(&self) -> Result<()> {
        let mut state = self.lock();
        state.stop_requested = true;
        self.wake.cancel();
        if state.attempt_live {
            self.inner.stop()?;
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        {
            let mut state = self.lock();
            state.stop_requested = true;
            self.wake.cancel();
        }
        self.inner.close().await
    }
}
