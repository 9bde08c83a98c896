//! Stop protocol: graceful signal, then forced kill after a single timer.
//!
//! ```text
//!            SIGTERM → group
//!   ┌──────────────────────────┐
//!   │ Graceful                 │── child exits ──► done
//!   └────────────┬─────────────┘
//!        grace timer fires
//!            SIGKILL → group
//!   ┌────────────▼─────────────┐
//!   │ Forced (unbounded wait)  │── child exits ──► done
//!   └──────────────────────────┘
//! ```

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;
use tokio::process::Child;
use tokio::{select, time};
use tracing::{debug, warn};

use super::PROCESS_TARGET;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Graceful,
    Forced,
}

/// Terminates the process group led by `child` and reaps the child.
pub(crate) async fn terminate(child: &mut Child, pgid: Pid, grace: Duration) -> io::Result<ExitStatus> {
    signal_group(pgid, Signal::SIGTERM);
    let mut phase = Phase::Graceful;

    let timer = time::sleep(grace);
    tokio::pin!(timer);

    loop {
        select! {
            status = child.wait() => {
                debug!(target: PROCESS_TARGET, pgid = pgid.as_raw(), ?phase, "process terminated");
                return status;
            }
            _ = &mut timer, if phase == Phase::Graceful => {
                debug!(
                    target: PROCESS_TARGET,
                    pgid = pgid.as_raw(),
                    grace = ?grace,
                    "graceful shutdown timed out; escalating"
                );
                signal_group(pgid, Signal::SIGKILL);
                phase = Phase::Forced;
            }
        }
    }
}

/// Sends `signal` to the group; a group that is already gone counts as delivered.
pub(crate) fn signal_group(pgid: Pid, signal: Signal) {
    match killpg(pgid, signal) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(errno) => warn!(
            target: PROCESS_TARGET,
            pgid = pgid.as_raw(),
            signal = signal.as_str(),
            %errno,
            "failed to signal process group"
        ),
    }
}
