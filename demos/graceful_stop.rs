//! # Example: graceful_stop
//!
//! Runs a service that ignores SIGTERM, asks it to stop, and shows the escalation
//! to SIGKILL after the grace period. Events are consumed through a [`Bus`].
//!
//! ## Flow
//! ```text
//! run() ─► Preparing ─► Running
//! stop() ─► Stopping (SIGTERM to the group)
//!        ─► 500ms grace expires ─► SIGKILL ─► Stopped (killed by signal SIGKILL)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example graceful_stop
//! ```

use std::sync::Arc;
use std::time::Duration;

use svcvisor::{Args, Bus, ProcessRunner, Runner, RunnerConfig};
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = RunnerConfig::default()
        .with_log_path(std::env::temp_dir())
        .with_graceful_shutdown_timeout(Duration::from_millis(500));

    let svc = Arc::new(ProcessRunner::new(
        Args::new(
            "demo-stubborn",
            ["/bin/sh", "-c", "trap 'echo ignoring TERM' TERM; while :; do sleep 0.1; done"],
        ),
        cfg,
    ));

    let bus = Bus::new(16);
    let mut events = bus.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(ev) = events.recv().await {
            println!("[{:>9}] {}", ev.state, ev.message);
            if ev.state.is_terminal() {
                break;
            }
        }
    });

    svc.open(CancellationToken::new()).await?;
    let run = tokio::spawn({
        let svc = svc.clone();
        async move { svc.run(Arc::new(bus)).await }
    });

    tokio::time::sleep(Duration::from_millis(300)).await;
    svc.stop()?;

    run.await??;
    printer.await?;
    svc.close().await?;
    Ok(())
}
