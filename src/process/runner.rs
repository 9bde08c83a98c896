//! # ProcessRunner: one service, one process at a time.
//!
//! ## Flow of one `run`
//! ```text
//! run(sink)
//!   ├─► stop already requested? ─► Stopped, Ok
//!   ├─► Preparing
//!   ├─► spawn ── Err ─► Failed, Err(Launch)
//!   ├─► Running
//!   ├─► capture stdout+stderr ─► <log_path>/<id>.log
//!   └─► select (first wins)
//!         ├─ child exits      ─► drain ─► Finished, Ok | Failed, Err(Exit)
//!         ├─ stop()           ─┐
//!         └─ open token fired ─┴► Stopping ─► SIGTERM … SIGKILL ─► drain ─► Finished | Stopped, Ok
//! ```
//!
//! ## Rules
//! - `stop` only cancels a token; the `run` that spawned the child signals and reaps it.
//!   The token is never reset, so a stopped runner stays stopped.
//! - `close` cancels the open context and returns. An in-flight `run` keeps its own
//!   handle on the log file until it has reaped the child and drained output.
//! - Events of one `run` are emitted from the `run` task only, so they cannot reorder.
//! - Output of an attempt is flushed before its terminal event.

use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::process::Child;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::PROCESS_TARGET;
use super::capture::Capture;
use super::log::LogFile;
use super::spawn::{Spawned, spawn};
use super::terminate::terminate;
use crate::config::{Args, RunnerConfig};
use crate::error::{ExitKind, Result, RunnerError};
use crate::events::{Event, ServiceState, SinkRef};
use crate::runners::Runner;

/// Resources acquired by `open`.
#[derive(Clone)]
struct Opened {
    /// Child of the token given to `open`; cancelled by `close`.
    ctx: CancellationToken,
    log: LogFile,
}

enum Lifecycle {
    Idle,
    Open(Opened),
    Closed,
}

/// Why the wait for the child ended.
enum Outcome {
    Exited(std::io::Result<ExitStatus>),
    StopRequested,
    Cancelled,
}

/// Runs one external process per `run` call, capturing its output to a log file.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
/// use svcvisor::{Args, Event, ProcessRunner, Runner, RunnerConfig, SinkRef};
///
/// # async fn demo() -> svcvisor::Result<()> {
/// let runner = ProcessRunner::new(
///     Args::new("hello", ["/bin/echo", "hello"]),
///     RunnerConfig::default().with_log_path("/tmp"),
/// );
/// let sink: SinkRef = Arc::new(|ev: &Event| println!("{} {}", ev.state, ev.message));
///
/// runner.open(CancellationToken::new()).await?;
/// runner.run(sink).await?;
/// runner.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct ProcessRunner {
    args: Args,
    cfg: RunnerConfig,
    /// Cancelled by `stop`; never reset.
    stop: CancellationToken,
    state: Mutex<Lifecycle>,
}

impl ProcessRunner {
    /// Creates a runner for `args`; nothing is touched until [`Runner::open`].
    pub fn new(args: Args, cfg: RunnerConfig) -> Self {
        Self {
            args,
            cfg,
            stop: CancellationToken::new(),
            state: Mutex::new(Lifecycle::Idle),
        }
    }

    /// Service arguments.
    pub fn args(&self) -> &Args {
        &self.args
    }

    /// Runner configuration.
    pub fn config(&self) -> &RunnerConfig {
        &self.cfg
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Lifecycle> {
        self.state.lock().unwrap_or_else(|poison| poison.into_inner())
    }

    fn opened(&self) -> Result<Opened> {
        match &*self.lock() {
            Lifecycle::Open(opened) => Ok(opened.clone()),
            Lifecycle::Idle | Lifecycle::Closed => Err(RunnerError::NotOpened {
                id: self.args.id.clone(),
            }),
        }
    }

    fn emit(&self, sink: &SinkRef, state: ServiceState, message: impl Into<std::sync::Arc<str>>) {
        sink.on_event(&Event::new(state, self.args.id.as_str()).with_message(message));
    }

    /// Waits for the first of: natural exit, `stop`, open-token cancellation.
    async fn wait_or_stop(&self, child: &mut Child, ctx: &CancellationToken) -> Outcome {
        select! {
            biased;
            status = child.wait() => Outcome::Exited(status),
            _ = self.stop.cancelled() => Outcome::StopRequested,
            _ = ctx.cancelled() => Outcome::Cancelled,
        }
    }

    fn report_exit(&self, sink: &SinkRef, status: std::io::Result<ExitStatus>) -> Result<()> {
        let status = match status {
            Ok(status) => status,
            Err(err) => {
                let err = RunnerError::io("wait for process", err);
                self.emit(sink, ServiceState::Failed, err.to_string());
                return Err(err);
            }
        };

        if status.success() {
            self.emit(sink, ServiceState::Finished, "Service finished successfully");
            return Ok(());
        }

        let kind = exit_kind(status);
        sink.on_event(
            &Event::new(ServiceState::Failed, self.args.id.as_str())
                .with_message(format!("Service failed: {kind}"))
                .with_exit(kind),
        );
        Err(RunnerError::Exit { kind })
    }
}

fn exit_kind(status: ExitStatus) -> ExitKind {
    match (status.code(), status.signal()) {
        (Some(code), _) => ExitKind::Code(code),
        (None, Some(sig)) => ExitKind::Signal(sig),
        (None, None) => ExitKind::Code(-1),
    }
}

#[async_trait]
impl Runner for ProcessRunner {
    fn id(&self) -> &str {
        &self.args.id
    }

    async fn open(&self, token: CancellationToken) -> Result<()> {
        self.args.validate_id()?;
        if !matches!(*self.lock(), Lifecycle::Idle) {
            return Err(RunnerError::AlreadyOpened {
                id: self.args.id.clone(),
            });
        }

        let log = LogFile::open(self.args.log_file(&self.cfg.log_path)).await?;

        let mut state = self.lock();
        if !matches!(*state, Lifecycle::Idle) {
            return Err(RunnerError::AlreadyOpened {
                id: self.args.id.clone(),
            });
        }
        *state = Lifecycle::Open(Opened {
            ctx: token.child_token(),
            log,
        });
        Ok(())
    }

    async fn run(&self, sink: SinkRef) -> Result<()> {
        let Opened { ctx, log } = self.opened()?;

        if self.stop.is_cancelled() || ctx.is_cancelled() {
            self.emit(&sink, ServiceState::Stopped, "Service stopped before launch");
            return Ok(());
        }

        self.emit(&sink, ServiceState::Preparing, "Starting service");

        let Spawned {
            mut child,
            pgid,
            stdout,
            stderr,
        } = match spawn(&self.args.process_args) {
            Ok(spawned) => spawned,
            Err(err) => {
                self.emit(&sink, ServiceState::Failed, format!("Failed to start: {err}"));
                return Err(err);
            }
        };
        self.emit(
            &sink,
            ServiceState::Running,
            format!("Process started with PID {pgid}"),
        );

        let capture = Capture::start(&log, stdout, stderr);

        let reason = match self.wait_or_stop(&mut child, &ctx).await {
            Outcome::Exited(status) => {
                capture.finish().await;
                return self.report_exit(&sink, status);
            }
            Outcome::StopRequested => "stop request",
            Outcome::Cancelled => "cancellation",
        };

        self.emit(
            &sink,
            ServiceState::Stopping,
            format!("Sending SIGTERM to process group {pgid} on {reason}"),
        );
        let status = terminate(&mut child, pgid, self.cfg.graceful_shutdown_timeout).await;
        capture.finish().await;

        match status {
            Ok(status) if status.success() => {
                self.emit(&sink, ServiceState::Finished, "Service finished after stop request");
            }
            Ok(status) => {
                let kind = exit_kind(status);
                sink.on_event(
                    &Event::new(ServiceState::Stopped, self.args.id.as_str())
                        .with_message(format!("Service stopped ({kind})"))
                        .with_exit(kind),
                );
            }
            Err(err) => {
                debug!(target: PROCESS_TARGET, id = %self.args.id, %err, "reaping stopped process failed");
                self.emit(&sink, ServiceState::Stopped, "Service stopped");
            }
        }
        Ok(())
    }

    /// Sticky: later `run` calls report `Stopped` without spawning.
    fn stop(&self) -> Result<()> {
        self.stop.cancel();
        Ok(())
    }

    /// Cancels any in-flight `run` and flushes the log. The in-flight `run` still owns
    /// the child and writes its last output before it returns.
    async fn close(&self) -> Result<()> {
        let previous = std::mem::replace(&mut *self.lock(), Lifecycle::Closed);
        if let Lifecycle::Open(Opened { ctx, log }) = previous {
            ctx.cancel();
            log.flush()
                .await
                .map_err(|e| RunnerError::io(format!("flush log file {}", log.path().display()), e))?;
        }
        Ok(())
    }
}
