//! Error types produced by runners.
//!
//! [`RunnerError`] folds every low-level OS failure into a small set of kinds:
//!
//! - **I/O** ([`RunnerError::Io`]) the log file could not be opened, written or flushed;
//! - **launch** ([`RunnerError::Launch`]) the executable could not be started;
//! - **exit** ([`RunnerError::Exit`]) the process ran and ended unsuccessfully;
//! - **contract** ([`RunnerError::InvalidId`], [`RunnerError::NotOpened`],
//!   [`RunnerError::AlreadyOpened`]) the runner was driven out of order.
//!
//! A stop request is never an error: a `run` that ends because the caller asked
//! it to returns `Ok(())`.

use std::fmt;
use std::io;
use std::sync::Arc;

use nix::sys::signal::Signal;
use thiserror::Error;

/// Shorthand result type used across the crate.
pub type Result<T, E = RunnerError> = std::result::Result<T, E>;

/// How a process ended when it did not succeed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitKind {
    /// Exited on its own with a nonzero status code.
    Code(i32),
    /// Terminated by a signal (raw signal number).
    Signal(i32),
}

impl fmt::Display for ExitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitKind::Code(code) => write!(f, "exit code {code}"),
            ExitKind::Signal(sig) => match Signal::try_from(*sig) {
                Ok(signal) => write!(f, "killed by signal {}", signal.as_str()),
                Err(_) => write!(f, "killed by signal {sig}"),
            },
        }
    }
}

/// # Errors produced by runners.
///
/// The restart layer only looks at `Ok`/`Err`; the variants exist for callers
/// that want to report or classify failures.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum RunnerError {
    /// Filesystem or pipe I/O failed (typically: the log file could not be opened).
    #[error("{context}: {source}")]
    Io {
        /// What the runner was doing.
        context: String,
        /// Underlying OS error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The executable could not be started.
    #[error("failed to launch {command:?}: {source}")]
    Launch {
        /// `argv[0]` of the process that failed to start.
        command: String,
        /// Underlying spawn error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The process ran and exited unsuccessfully.
    #[error("process failed: {kind}")]
    Exit {
        /// Exit code or terminating signal.
        kind: ExitKind,
    },

    /// The service identifier cannot be used as a log file stem.
    #[error("invalid service id {id:?}")]
    InvalidId {
        /// Offending identifier.
        id: String,
    },

    /// `run` was called before `open`.
    #[error("runner {id:?} is not open")]
    NotOpened {
        /// Service identifier.
        id: String,
    },

    /// `open` was called twice.
    #[error("runner {id:?} is already open")]
    AlreadyOpened {
        /// Service identifier.
        id: String,
    },
}

impl RunnerError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        RunnerError::Io {
            context: context.into(),
            source: Arc::new(source),
        }
    }

    pub(crate) fn launch(command: impl Into<String>, source: io::Error) -> Self {
        RunnerError::Launch {
            command: command.into(),
            source: Arc::new(source),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use svcvisor::{ExitKind, RunnerError};
    ///
    /// let err = RunnerError::Exit { kind: ExitKind::Code(3) };
    /// assert_eq!(err.as_label(), "runner_exit");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RunnerError::Io { .. } => "runner_io",
            RunnerError::Launch { .. } => "runner_launch",
            RunnerError::Exit { .. } => "runner_exit",
            RunnerError::InvalidId { .. } => "runner_invalid_id",
            RunnerError::NotOpened { .. } => "runner_not_opened",
            RunnerError::AlreadyOpened { .. } => "runner_already_opened",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RunnerError::Io { context, source } => format!("io: {context}: {source}"),
            RunnerError::Launch { command, source } => format!("launch: {command}: {source}"),
            RunnerError::Exit { kind } => format!("exit: {kind}"),
            RunnerError::InvalidId { id } => format!("invalid id: {id:?}"),
            RunnerError::NotOpened { id } => format!("not opened: {id}"),
            RunnerError::AlreadyOpened { id } => format!("already opened: {id}"),
        }
    }

    /// Indicates whether a restart policy may retry after this error.
    ///
    /// Returns `true` for [`RunnerError::Launch`] and [`RunnerError::Exit`].
    pub fn is_retryable(&self) -> bool {
        matches!(self, RunnerError::Launch { .. } | RunnerError::Exit { .. })
    }

    /// Exit code of a process that exited on its own with a nonzero status.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            RunnerError::Exit {
                kind: ExitKind::Code(code),
            } => Some(*code),
            _ => None,
        }
    }

    /// Signal number of a process that was killed by a signal.
    pub fn signal(&self) -> Option<i32> {
        match self {
            RunnerError::Exit {
                kind: ExitKind::Signal(sig),
            } => Some(*sig),
            _ => None,
        }
    }
}
