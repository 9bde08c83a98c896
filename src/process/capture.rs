//! Copying the child's stdout and stderr into the log file.
//!
//! One task per stream; each forwards whole read chunks to the shared
//! [`LogFile`], so a stream's own bytes stay in order while the two streams
//! interleave in lock order.

use std::time::Duration;

use futures::StreamExt;
use tokio::io::AsyncRead;
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use super::PROCESS_TARGET;
use super::log::LogFile;

/// How long to wait for EOF on the pipes once the process has exited.
///
/// Descendants that inherited the pipes can keep them open indefinitely.
pub(crate) const DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

pub(crate) struct Capture {
    log: LogFile,
    tasks: Vec<JoinHandle<()>>,
}

impl Capture {
    pub(crate) fn start<O, E>(log: &LogFile, stdout: O, stderr: E) -> Self
    where
        O: AsyncRead + Unpin + Send + 'static,
        E: AsyncRead + Unpin + Send + 'static,
    {
        let tasks = vec![
            tokio::spawn(follow_output("stdout", stdout, log.clone())),
            tokio::spawn(follow_output("stderr", stderr, log.clone())),
        ];
        Self {
            log: log.clone(),
            tasks,
        }
    }

    /// Waits for both streams to hit EOF (bounded by [`DRAIN_TIMEOUT`]) and flushes.
    pub(crate) async fn finish(self) {
        let Capture { log, tasks } = self;
        let aborts: Vec<_> = tasks.iter().map(JoinHandle::abort_handle).collect();

        if time::timeout(DRAIN_TIMEOUT, futures::future::join_all(tasks))
            .await
            .is_err()
        {
            warn!(
                target: PROCESS_TARGET,
                log = %log.path().display(),
                "output pipes still open after process exit; abandoning capture"
            );
            for handle in aborts {
                handle.abort();
            }
        }

        if let Err(err) = log.flush().await {
            warn!(target: PROCESS_TARGET, log = %log.path().display(), %err, "log flush failed");
        }
    }
}

async fn follow_output<R>(stream: &'static str, reader: R, log: LogFile)
where
    R: AsyncRead + Unpin,
{
    let mut chunks = ReaderStream::new(reader);
    let mut write_failed = false;

    while let Some(chunk) = chunks.next().await {
        let bytes = match chunk {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(target: PROCESS_TARGET, stream, %err, "read from child failed");
                break;
            }
        };
        // Keep draining after a write error so the child never blocks on a full pipe.
        if write_failed {
            continue;
        }
        if let Err(err) = log.write(&bytes).await {
            warn!(
                target: PROCESS_TARGET,
                stream,
                log = %log.path().display(),
                %err,
                "log write failed; discarding further output"
            );
            write_failed = true;
        }
    }
}
