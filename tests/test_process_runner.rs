mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use svcvisor::{
    Args, ExitKind, ProcessRunner, Runner, RunnerConfig, RunnerError, ServiceState,
};
use tokio_util::sync::CancellationToken;

use common::{Recorder, process, read_log, sh};

#[tokio::test]
async fn test_run_success() {
    let dir = tempfile::tempdir().unwrap();
    let runner = process(dir.path(), "test", sh("exit 0"));
    let rec = Recorder::default();

    runner.open(CancellationToken::new()).await.unwrap();
    runner.run(rec.sink()).await.unwrap();
    runner.close().await.unwrap();

    assert_eq!(
        rec.states(),
        [ServiceState::Preparing, ServiceState::Running, ServiceState::Finished]
    );
    let seqs: Vec<u64> = rec.events().iter().map(|e| e.seq).collect();
    assert!(seqs.windows(2).all(|w| w[0] < w[1]));
    assert!(rec.events().iter().all(|e| &*e.service == "test"));
}

#[tokio::test]
async fn test_run_logs_exact_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let runner = process(
        dir.path(),
        "logtest",
        vec!["/bin/echo".into(), "-n".into(), "Test 1\nTest 2\n".into()],
    );

    runner.open(CancellationToken::new()).await.unwrap();
    runner.run(Recorder::default().sink()).await.unwrap();
    runner.close().await.unwrap();

    assert_eq!(read_log(dir.path(), "logtest"), b"Test 1\nTest 2\n");
}

#[tokio::test]
async fn test_run_captures_stdout_and_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let runner = process(
        dir.path(),
        "both",
        sh("echo out-1; echo err-1 >&2; echo out-2; echo err-2 >&2"),
    );

    runner.open(CancellationToken::new()).await.unwrap();
    runner.run(Recorder::default().sink()).await.unwrap();
    runner.close().await.unwrap();

    let log = String::from_utf8(read_log(dir.path(), "both")).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 4, "{log:?}");

    let pos = |needle: &str| lines.iter().position(|l| *l == needle).unwrap();
    assert!(pos("out-1") < pos("out-2"));
    assert!(pos("err-1") < pos("err-2"));
}

#[tokio::test]
async fn test_log_appends_across_runners() {
    let dir = tempfile::tempdir().unwrap();
    for _ in 0..2 {
        let runner = process(dir.path(), "append", sh("printf 'x\\n'"));
        runner.open(CancellationToken::new()).await.unwrap();
        runner.run(Recorder::default().sink()).await.unwrap();
        runner.close().await.unwrap();
    }
    assert_eq!(read_log(dir.path(), "append"), b"x\nx\n");
}

#[tokio::test]
async fn test_run_nonzero_exit() {
    let dir = tempfile::tempdir().unwrap();
    let runner = process(dir.path(), "fail", sh("exit 3"));
    let rec = Recorder::default();

    runner.open(CancellationToken::new()).await.unwrap();
    let err = runner.run(rec.sink()).await.unwrap_err();
    runner.close().await.unwrap();

    assert_eq!(err.exit_code(), Some(3));
    assert_eq!(rec.states().last(), Some(&ServiceState::Failed));
    assert_eq!(rec.events().last().unwrap().exit, Some(ExitKind::Code(3)));
}

#[tokio::test]
async fn test_run_killed_by_signal() {
    let dir = tempfile::tempdir().unwrap();
    let runner = process(dir.path(), "killed", sh("kill -KILL $$"));

    runner.open(CancellationToken::new()).await.unwrap();
    let err = runner.run(Recorder::default().sink()).await.unwrap_err();
    runner.close().await.unwrap();

    assert_eq!(err.signal(), Some(9));
    assert_eq!(err.exit_code(), None);
}

#[tokio::test]
async fn test_launch_error() {
    let dir = tempfile::tempdir().unwrap();
    let runner = process(dir.path(), "missing", vec!["/nonexistent/binary".into()]);
    let rec = Recorder::default();

    runner.open(CancellationToken::new()).await.unwrap();
    let err = runner.run(rec.sink()).await.unwrap_err();
    runner.close().await.unwrap();

    assert!(matches!(err, RunnerError::Launch { .. }), "{err:?}");
    assert_eq!(rec.states(), [ServiceState::Preparing, ServiceState::Failed]);
}

#[tokio::test]
async fn test_stop_sigkill() {
    let dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(ProcessRunner::new(
        Args::new("nokill", sh("trap '' TERM; while :; do :; done")),
        RunnerConfig::default()
            .with_log_path(dir.path())
            .with_graceful_shutdown_timeout(Duration::from_millis(10)),
    ));
    let rec = Recorder::default();

    runner.open(CancellationToken::new()).await.unwrap();
    let handle = tokio::spawn({
        let runner = runner.clone();
        let sink = rec.sink();
        async move { runner.run(sink).await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    let started = Instant::now();
    runner.stop().unwrap();
    handle.await.unwrap().unwrap();
    let elapsed = started.elapsed();
    runner.close().await.unwrap();

    assert!(elapsed >= Duration::from_millis(10), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(5), "{elapsed:?}");
    assert_eq!(
        rec.states(),
        [
            ServiceState::Preparing,
            ServiceState::Running,
            ServiceState::Stopping,
            ServiceState::Stopped
        ]
    );
    assert_eq!(rec.events().last().unwrap().exit, Some(ExitKind::Signal(9)));
}

#[tokio::test]
async fn test_stop_graceful_exit_reports_finished() {
    let dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(process(
        dir.path(),
        "polite",
        sh("trap 'exit 0' TERM; while :; do sleep 0.05; done"),
    ));
    let rec = Recorder::default();

    runner.open(CancellationToken::new()).await.unwrap();
    let handle = tokio::spawn({
        let runner = runner.clone();
        let sink = rec.sink();
        async move { runner.run(sink).await }
    });

    assert!(rec.wait_for(ServiceState::Running, Duration::from_secs(5)).await);
    tokio::time::sleep(Duration::from_millis(100)).await;
    runner.stop().unwrap();
    handle.await.unwrap().unwrap();
    runner.close().await.unwrap();

    assert_eq!(
        rec.states()[2..],
        [ServiceState::Stopping, ServiceState::Finished]
    );
}

#[tokio::test]
async fn test_stop_before_run_is_remembered() {
    let dir = tempfile::tempdir().unwrap();
    let runner = process(dir.path(), "early", sh("echo should-not-run"));
    let rec = Recorder::default();

    runner.open(CancellationToken::new()).await.unwrap();
    runner.stop().unwrap();
    runner.run(rec.sink()).await.unwrap();
    runner.close().await.unwrap();

    assert_eq!(rec.states(), [ServiceState::Stopped]);
    assert!(read_log(dir.path(), "early").is_empty());
}

#[tokio::test]
async fn test_stop_is_sticky_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let runner = process(dir.path(), "sticky", sh("echo ran"));
    let first = Recorder::default();
    let second = Recorder::default();

    runner.open(CancellationToken::new()).await.unwrap();
    runner.run(first.sink()).await.unwrap();
    runner.stop().unwrap();
    runner.run(second.sink()).await.unwrap();
    runner.close().await.unwrap();

    assert_eq!(first.states().last(), Some(&ServiceState::Finished));
    assert_eq!(second.states(), [ServiceState::Stopped]);
    assert_eq!(read_log(dir.path(), "sticky"), b"ran\n");
}

#[tokio::test]
async fn test_repeated_stop_keeps_grace_deadline() {
    let dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(ProcessRunner::new(
        Args::new("stubborn", sh("trap '' TERM; while :; do :; done")),
        RunnerConfig::default()
            .with_log_path(dir.path())
            .with_graceful_shutdown_timeout(Duration::from_millis(300)),
    ));
    let rec = Recorder::default();

    runner.open(CancellationToken::new()).await.unwrap();
    let handle = tokio::spawn({
        let runner = runner.clone();
        let sink = rec.sink();
        async move { runner.run(sink).await }
    });

    assert!(rec.wait_for(ServiceState::Running, Duration::from_secs(5)).await);
    // let the shell install its trap
    tokio::time::sleep(Duration::from_millis(100)).await;

    let started = Instant::now();
    runner.stop().unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    runner.stop().unwrap();
    handle.await.unwrap().unwrap();
    let elapsed = started.elapsed();
    runner.close().await.unwrap();

    assert!(elapsed >= Duration::from_millis(300), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(500), "{elapsed:?}");
    assert_eq!(rec.count(ServiceState::Stopping), 1);
    let last = rec.events().last().cloned().unwrap();
    assert_eq!(last.state, ServiceState::Stopped);
    assert_eq!(last.exit, Some(ExitKind::Signal(9)));
}

#[tokio::test]
async fn test_close_while_running() {
    let dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(process(
        dir.path(),
        "closed",
        sh("echo started; exec sleep 30"),
    ));
    let rec = Recorder::default();

    runner.open(CancellationToken::new()).await.unwrap();
    let handle = tokio::spawn({
        let runner = runner.clone();
        let sink = rec.sink();
        async move { runner.run(sink).await }
    });

    assert!(rec.wait_for(ServiceState::Running, Duration::from_secs(5)).await);
    tokio::time::sleep(Duration::from_millis(50)).await;
    runner.close().await.unwrap();

    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("run should return after close")
        .unwrap()
        .unwrap();

    assert_eq!(rec.states().last(), Some(&ServiceState::Stopped));
    assert_eq!(read_log(dir.path(), "closed"), b"started\n");
    let err = runner.run(Recorder::default().sink()).await.unwrap_err();
    assert!(matches!(err, RunnerError::NotOpened { .. }));
}

#[tokio::test]
async fn test_cancellation_token_stops_process() {
    let dir = tempfile::tempdir().unwrap();
    let token = CancellationToken::new();
    let runner = Arc::new(process(dir.path(), "cancel", sh("sleep 30")));
    let rec = Recorder::default();

    runner.open(token.clone()).await.unwrap();
    let handle = tokio::spawn({
        let runner = runner.clone();
        let sink = rec.sink();
        async move { runner.run(sink).await }
    });

    assert!(rec.wait_for(ServiceState::Running, Duration::from_secs(5)).await);
    let started = Instant::now();
    token.cancel();
    handle.await.unwrap().unwrap();
    runner.close().await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(rec.count(ServiceState::Stopping), 1);
    assert_eq!(rec.states().last(), Some(&ServiceState::Stopped));
}

#[tokio::test]
async fn test_close_without_run() {
    let dir = tempfile::tempdir().unwrap();
    let runner = process(dir.path(), "idle", sh("exit 0"));

    runner.open(CancellationToken::new()).await.unwrap();
    runner.close().await.unwrap();
    runner.close().await.unwrap();

    assert!(dir.path().join("idle.log").exists());
}

#[tokio::test]
async fn test_contract_errors() {
    let dir = tempfile::tempdir().unwrap();

    let runner = process(dir.path(), "order", sh("exit 0"));
    let err = runner.run(Recorder::default().sink()).await.unwrap_err();
    assert!(matches!(err, RunnerError::NotOpened { .. }));

    runner.open(CancellationToken::new()).await.unwrap();
    let err = runner.open(CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, RunnerError::AlreadyOpened { .. }));
    runner.close().await.unwrap();

    let runner = process(&dir.path().join("missing"), "nodir", sh("exit 0"));
    let err = runner.open(CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, RunnerError::Io { .. }), "{err:?}");

    let runner = process(dir.path(), "../escape", sh("exit 0"));
    let err = runner.open(CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, RunnerError::InvalidId { .. }));
}
