//! Dispatch run types.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use super::item::{Outcome, WorkerId};
use super::ledger::LedgerSnapshot;

/// Errors that abort a dispatch run.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The pool must have at least one worker.
    #[error("Worker pool size must be at least 1")]
    ZeroWorkers,

    /// One uploader is needed per worker.
    #[error("Expected {expected} uploaders, got {actual}")]
    WorkerCountMismatch { expected: usize, actual: usize },

    /// A worker task ended without draining its assignments.
    #[error("Workers aborted: {workers:?}")]
    WorkerAborted { workers: Vec<WorkerId> },
}

/// Sent to the reporter before any worker starts.
#[derive(Debug, Clone)]
pub struct RunStart {
    pub run_id: Uuid,
    pub total: usize,
    pub workers: usize,
    /// Files waiting to be sent, in backlog order.
    pub files: Vec<PathBuf>,
}

/// Final state of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Items never handed to a worker because the run was cancelled.
    pub skipped: usize,
    pub cancelled: bool,
    /// Every outcome, in completion order.
    pub outcomes: Vec<Outcome>,
}

impl RunSummary {
    pub fn completed(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }

    /// Number of items processed by one worker.
    pub fn processed_by(&self, worker: WorkerId) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.worker_id() == worker)
            .count()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        let completed = self.completed();
        LedgerSnapshot {
            completed,
            failed: self.failed,
            total: self.total,
            percent: super::Ledger::percent_of(completed, self.total, 100) as u8,
        }
    }
}

/// Stops a run from handing out further items.
///
/// Uploads already in flight finish and are recorded.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{UploadContext, WorkItem};
    use serde_json::json;

    #[test]
    fn test_cancel_handle_is_shared() {
        let handle = CancelHandle::default();
        let clone = handle.clone();
        assert!(!handle.is_cancelled());
        clone.cancel();
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_summary_helpers() {
        let context = Arc::new(UploadContext::new("s", None));
        let a = WorkItem::new("a.pdf", Arc::clone(&context));
        let b = WorkItem::new("b.pdf", Arc::clone(&context));
        let summary = RunSummary {
            run_id: Uuid::new_v4(),
            total: 2,
            succeeded: 1,
            failed: 1,
            skipped: 0,
            cancelled: false,
            outcomes: vec![
                Outcome::success(&a, 0, json!({})),
                Outcome::failure(&b, 1, "nope"),
            ],
        };

        assert_eq!(summary.completed(), 2);
        assert_eq!(summary.failures().count(), 1);
        assert_eq!(summary.processed_by(0), 1);
        assert_eq!(summary.processed_by(7), 0);
        assert_eq!(summary.snapshot().percent, 100);
    }
}
