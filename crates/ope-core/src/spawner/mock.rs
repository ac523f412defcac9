//! Recording spawner for testing
//!
//! Captures every request instead of starting a process, so dispatcher
//! behaviour can be checked without a companion on disk.

use std::io;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::spawner::{DispatchRequest, ExitSummary, Spawner};

/// What the mock reports for each run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockOutcome {
    /// The companion ran and exited with this code.
    Exit(i32),
    /// The companion could not be started.
    SpawnFailure,
}

/// Spawner that records requests and returns a configured outcome.
#[derive(Debug, Clone)]
pub struct RecordingSpawner {
    outcome: MockOutcome,
    run_time: Duration,
    requests: Vec<DispatchRequest>,
    finished_at: Vec<Instant>,
}

impl RecordingSpawner {
    pub fn new(outcome: MockOutcome) -> Self {
        Self {
            outcome,
            run_time: Duration::ZERO,
            requests: Vec::new(),
            finished_at: Vec::new(),
        }
    }

    /// Companion that exits with status 0.
    pub fn succeeding() -> Self {
        Self::new(MockOutcome::Exit(0))
    }

    /// Simulate a companion that takes `run_time` to exit.
    pub fn with_run_time(mut self, run_time: Duration) -> Self {
        self.run_time = run_time;
        self
    }

    pub fn requests(&self) -> &[DispatchRequest] {
        &self.requests
    }

    /// When each run returned to the caller.
    pub fn finished_at(&self) -> &[Instant] {
        &self.finished_at
    }
}

impl Spawner for RecordingSpawner {
    fn run(&mut self, request: &DispatchRequest) -> Result<ExitSummary> {
        self.requests.push(request.clone());

        let result = match self.outcome {
            MockOutcome::Exit(code) => {
                if !self.run_time.is_zero() {
                    thread::sleep(self.run_time);
                }
                Ok(ExitSummary::from_code(code))
            }
            MockOutcome::SpawnFailure => Err(Error::SpawnFailed {
                program: request.program().to_path_buf(),
                source: io::Error::from(io::ErrorKind::NotFound),
            }),
        };

        self.finished_at.push(Instant::now());
        result
    }
}
