//! Append-only per-service log file.
//!
//! One file per service at `<log_path>/<id>.log`, created if absent and appended
//! to otherwise. Clones share the same handle; every write holds the lock for a
//! whole chunk so concurrent writers never split each other's chunks.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{Result, RunnerError};

#[derive(Clone, Debug)]
pub(crate) struct LogFile {
    path: Arc<Path>,
    file: Arc<Mutex<File>>,
}

impl LogFile {
    /// Opens (or creates) the file in append mode.
    pub(crate) async fn open(path: PathBuf) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| RunnerError::io(format!("open log file {}", path.display()), e))?;

        Ok(Self {
            path: Arc::from(path),
            file: Arc::new(Mutex::new(file)),
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one chunk.
    pub(crate) async fn write(&self, chunk: &[u8]) -> std::io::Result<()> {
        let mut file = self.file.lock().await;
        file.write_all(chunk).await
    }

    /// Pushes buffered bytes down to the OS.
    pub(crate) async fn flush(&self) -> std::io::Result<()> {
        let mut file = self.file.lock().await;
        file.flush().await
    }
}
