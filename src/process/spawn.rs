//! Launching the child process.
//!
//! The child gets `/dev/null` as stdin, piped stdout/stderr, and becomes the
//! leader of a new process group so signals can reach everything it starts.

use std::io;
use std::process::Stdio;

use nix::unistd::Pid;
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tracing::debug;

use super::PROCESS_TARGET;
use crate::error::{Result, RunnerError};

#[derive(Debug)]
pub(crate) struct Spawned {
    pub(crate) child: Child,
    /// Child pid, which is also its process group id.
    pub(crate) pgid: Pid,
    pub(crate) stdout: ChildStdout,
    pub(crate) stderr: ChildStderr,
}

pub(crate) fn spawn(argv: &[String]) -> Result<Spawned> {
    let Some((program, rest)) = argv.split_first() else {
        return Err(RunnerError::launch(
            "",
            io::Error::new(io::ErrorKind::InvalidInput, "empty process argument list"),
        ));
    };

    let mut cmd = Command::new(program);
    cmd.args(rest)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0)
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|e| RunnerError::launch(program, e))?;

    let pid = child
        .id()
        .and_then(|pid| i32::try_from(pid).ok())
        .ok_or_else(|| RunnerError::launch(program, io::Error::other("pid not available")))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| RunnerError::launch(program, io::Error::other("stdout not piped")))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| RunnerError::launch(program, io::Error::other("stderr not piped")))?;

    debug!(target: PROCESS_TARGET, program = %program, args = ?rest, pid, "process spawned");

    Ok(Spawned {
        child,
        pgid: Pid::from_raw(pid),
        stdout,
        stderr,
    })
}
