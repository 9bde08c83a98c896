//! # Example: restart_until_success
//!
//! A shell service that fails until a marker file appears. The restart wrapper
//! keeps re-running it with a fixed interval and reports every retry as `Waiting`.
//!
//! ## Flow
//! ```text
//! RestartRunner::run()
//!   ├─► attempt 1 ─► Preparing ─► Running ─► Failed (exit code 1)
//!   ├─► Waiting{attempt=2, delay=300ms}
//!   ├─► attempt 2 ─► ... ─► Failed
//!   │        (marker file created by main after ~1s)
//!   └─► attempt N ─► Preparing ─► Running ─► Finished ─► Ok(())
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example restart_until_success
//! ```

use std::sync::Arc;
use std::time::Duration;

use svcvisor::{
    Args, Event, ProcessRunner, RestartPolicy, RestartRunner, Runner, RunnerConfig, SinkRef,
};
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = std::env::temp_dir();
    let marker = dir.join("svcvisor-demo.ready");
    let _ = std::fs::remove_file(&marker);

    // 1. Configure: logs in the temp dir, retry every 300ms until success
    let cfg = RunnerConfig::default()
        .with_log_path(&dir)
        .with_restart(RestartPolicy::UntilSuccess)
        .with_restart_interval(Duration::from_millis(300));

    // 2. A service that only succeeds once the marker exists
    let script = format!("echo checking; test -f {}", marker.display());
    let svc = RestartRunner::with_config(
        ProcessRunner::new(Args::new("demo-flaky", ["/bin/sh", "-c", script.as_str()]), cfg.clone()),
        &cfg,
    );

    // 3. Print every lifecycle event
    let sink: SinkRef = Arc::new(|ev: &Event| {
        println!("[{:>9}] {} (attempt={:?})", ev.state, ev.message, ev.attempt);
    });

    // 4. Unblock the service after ~1s
    let unblock = marker.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        let _ = std::fs::File::create(unblock);
    });

    svc.open(CancellationToken::new()).await?;
    svc.run(sink).await?;
    svc.close().await?;

    println!("log: {}", dir.join("demo-flaky.log").display());
    let _ = std::fs::remove_file(&marker);
    Ok(())
}
