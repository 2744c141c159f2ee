//! Reporter that records every event.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::dispatch::{LedgerSnapshot, Outcome, RunStart, RunSummary};
use crate::reporter::Reporter;

/// Records run events for assertions.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    starts: Mutex<Vec<RunStart>>,
    progress: Mutex<Vec<(Outcome, LedgerSnapshot)>>,
    finishes: Mutex<Vec<RunSummary>>,
}

fn lock<T>(events: &Mutex<T>) -> MutexGuard<'_, T> {
    events.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starts(&self) -> Vec<RunStart> {
        lock(&self.starts).clone()
    }

    /// Progress events in the order they were delivered.
    pub fn progress(&self) -> Vec<(Outcome, LedgerSnapshot)> {
        lock(&self.progress).clone()
    }

    pub fn snapshots(&self) -> Vec<LedgerSnapshot> {
        lock(&self.progress).iter().map(|(_, s)| *s).collect()
    }

    pub fn finishes(&self) -> Vec<RunSummary> {
        lock(&self.finishes).clone()
    }
}

impl Reporter for RecordingReporter {
    fn on_start(&self, start: &RunStart) {
        lock(&self.starts).push(start.clone());
    }

    fn on_progress(&self, outcome: &Outcome, snapshot: &LedgerSnapshot) {
        lock(&self.progress).push((outcome.clone(), *snapshot));
    }

    fn on_finish(&self, summary: &RunSummary) {
        lock(&self.finishes).push(summary.clone());
    }
}
