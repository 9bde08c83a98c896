#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use svcvisor::{Args, Event, EventSink, ProcessRunner, RunnerConfig, ServiceState, SinkRef};

/// Sink that keeps every event it sees.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Recorder {
    pub fn sink(&self) -> SinkRef {
        Arc::new(self.clone())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn states(&self) -> Vec<ServiceState> {
        self.events().iter().map(|e| e.state).collect()
    }

    pub fn count(&self, state: ServiceState) -> usize {
        self.states().into_iter().filter(|s| *s == state).count()
    }

    /// Polls until an event in `state` shows up.
    pub async fn wait_for(&self, state: ServiceState, within: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + within;
        while tokio::time::Instant::now() < deadline {
            if self.count(state) > 0 {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        false
    }
}

impl EventSink for Recorder {
    fn on_event(&self, event: &Event) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub fn sh(script: &str) -> Vec<String> {
    vec!["/bin/sh".to_owned(), "-c".to_owned(), script.to_owned()]
}

pub fn process(dir: &Path, id: &str, argv: Vec<String>) -> ProcessRunner {
    ProcessRunner::new(
        Args::new(id, argv),
        RunnerConfig::default().with_log_path(dir),
    )
}

pub fn read_log(dir: &Path, id: &str) -> Vec<u8> {
    std::fs::read(dir.join(format!("{id}.log"))).unwrap()
}
