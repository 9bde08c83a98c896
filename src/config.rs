//! # Runner configuration.
//!
//! [`Args`] identifies one service and the command line it runs.
//! [`RunnerConfig`] carries the knobs applied at construction time; nothing here is
//! process-global, every runner receives its own copy.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use svcvisor::{Args, RestartPolicy, RunnerConfig};
//!
//! let args = Args::new("ntpd", ["/usr/bin/ntpd", "-n"]);
//! let cfg = RunnerConfig::default()
//!     .with_log_path("/run/log")
//!     .with_graceful_shutdown_timeout(Duration::from_secs(3))
//!     .with_restart(RestartPolicy::UntilSuccess);
//!
//! assert_eq!(args.log_file(&cfg.log_path).to_str(), Some("/run/log/ntpd.log"));
//! assert_eq!(cfg.restart_interval, Duration::from_secs(5));
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, RunnerError};
use crate::policies::{BackoffPolicy, RestartPolicy};

/// Service identity and command line.
///
/// `process_args[0]` is the executable (resolved through `PATH` when it has no
/// slash), the rest are its arguments. No shell is involved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Args {
    /// Unique service identifier; also the log file stem.
    pub id: String,
    /// Executable followed by its arguments.
    pub process_args: Vec<String>,
}

impl Args {
    /// Creates service arguments from an id and a command line.
    pub fn new<I, S>(id: impl Into<String>, process_args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            process_args: process_args.into_iter().map(Into::into).collect(),
        }
    }

    /// Path of this service's log file inside `dir`.
    pub fn log_file(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.log", self.id))
    }

    /// Rejects ids that cannot be used as a plain file stem.
    pub(crate) fn validate_id(&self) -> Result<()> {
        let id = self.id.as_str();
        let bad = id.is_empty()
            || id == "."
            || id == ".."
            || id.contains('/')
            || id.contains('\0');
        if bad {
            return Err(RunnerError::InvalidId { id: id.to_owned() });
        }
        Ok(())
    }
}

/// Configuration applied to runners at construction.
///
/// ## Field semantics
/// - `log_path`: directory holding `<id>.log` (must exist)
/// - `graceful_shutdown_timeout`: wait between SIGTERM and SIGKILL
/// - `restart_interval`: sleep between attempts of a restarting runner
/// - `restart`: restart policy of a restarting runner
#[derive(Clone, Debug)]
pub struct RunnerConfig {
    /// Directory for per-service log files.
    pub log_path: PathBuf,

    /// Upper bound between the graceful signal and the forced kill.
    ///
    /// Only bounds the SIGTERM → SIGKILL window; waiting for the process to die
    /// after SIGKILL is unbounded.
    pub graceful_shutdown_timeout: Duration,

    /// Delay between a finished attempt and the next one.
    pub restart_interval: Duration,

    /// When a restarting runner starts another attempt.
    pub restart: RestartPolicy,
}

impl RunnerConfig {
    /// Sets the log directory.
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = path.into();
        self
    }

    /// Sets the SIGTERM → SIGKILL window.
    pub fn with_graceful_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.graceful_shutdown_timeout = timeout;
        self
    }

    /// Sets the delay between restart attempts.
    pub fn with_restart_interval(mut self, interval: Duration) -> Self {
        self.restart_interval = interval;
        self
    }

    /// Sets the restart policy.
    pub fn with_restart(mut self, restart: RestartPolicy) -> Self {
        self.restart = restart;
        self
    }

    /// Constant backoff derived from `restart_interval`.
    #[inline]
    pub fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy::constant(self.restart_interval)
    }
}

impl Default for RunnerConfig {
    /// Default configuration:
    ///
    /// - `log_path = /var/log`
    /// - `graceful_shutdown_timeout = 10s`
    /// - `restart_interval = 5s`
    /// - `restart = RestartPolicy::Forever`
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("/var/log"),
            graceful_shutdown_timeout: Duration::from_secs(10),
            restart_interval: Duration::from_secs(5),
            restart: RestartPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_usable_as_file_stems() {
        for id in ["udevd", "kubelet-1", "a.b"] {
            assert!(Args::new(id, ["/bin/true"]).validate_id().is_ok(), "{id}");
        }
        for id in ["", ".", "..", "a/b", "nul\0"] {
            let err = Args::new(id, ["/bin/true"]).validate_id().unwrap_err();
            assert!(matches!(err, RunnerError::InvalidId { .. }), "{id:?}");
        }
    }

    #[test]
    fn backoff_is_constant_interval() {
        let cfg = RunnerConfig::default().with_restart_interval(Duration::from_millis(7));
        let backoff = cfg.backoff();
        for attempt in 0..5 {
            assert_eq!(backoff.next(attempt), Duration::from_millis(7));
        }
    }
}
