//! Supervisor: owns the backlog and ledger and drives the worker pool.
//!
//! Dispatch is pull disguised as push. Each worker reports completion through
//! [`CompletionHandler::on_complete`], and the supervisor answers with the
//! next backlog item from inside the same critical section that records the
//! outcome. A worker that finishes quickly comes back for work sooner, so the
//! pool stays busy without a separate ready queue.

use std::mem;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::reporter::Reporter;
use crate::uploader::Uploader;

use super::backlog::Backlog;
use super::config::DispatchConfig;
use super::item::{Outcome, WorkItem, WorkerId};
use super::ledger::Ledger;
use super::types::{CancelHandle, DispatchError, RunStart, RunSummary};
use super::worker::{CompletionHandler, Worker};

/// State guarded by the coordination lock.
struct Coordination {
    backlog: Backlog,
    ledger: Ledger,
}

/// The completion side of the supervisor, shared with every worker.
struct Dispatcher {
    state: Mutex<Coordination>,
    reporter: Arc<dyn Reporter>,
    cancel: CancelHandle,
}

#[async_trait]
impl CompletionHandler for Dispatcher {
    async fn on_complete(&self, worker: WorkerId, outcome: Outcome) -> Option<WorkItem> {
        let mut state = self.state.lock().await;

        state.ledger.record(outcome);

        let next = if self.cancel.is_cancelled() {
            None
        } else {
            state.backlog.take()
        };
        if next.is_none() {
            debug!("No more items for worker {}", worker);
        }

        let snapshot = state.ledger.snapshot();
        if let Some(last) = state.ledger.last() {
            self.reporter.on_progress(last, &snapshot);
        }

        next
    }
}

/// Distributes a backlog over a fixed pool of upload workers.
pub struct Supervisor {
    config: DispatchConfig,
    dispatcher: Arc<Dispatcher>,
    total: usize,
}

impl Supervisor {
    /// Creates a supervisor over an already discovered backlog.
    pub fn new(config: DispatchConfig, backlog: Backlog, reporter: Arc<dyn Reporter>) -> Self {
        let total = backlog.len();
        let dispatcher = Dispatcher {
            state: Mutex::new(Coordination {
                backlog,
                ledger: Ledger::new(total),
            }),
            reporter,
            cancel: CancelHandle::default(),
        };

        Self {
            config,
            dispatcher: Arc::new(dispatcher),
            total,
        }
    }

    pub fn total_items(&self) -> usize {
        self.total
    }

    /// Handle that stops further assignments when cancelled.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.dispatcher.cancel.clone()
    }

    /// Runs the pool with every worker sharing one uploader.
    pub async fn run_shared(
        self,
        uploader: Arc<dyn Uploader>,
    ) -> Result<RunSummary, DispatchError> {
        let uploaders = (0..self.config.workers)
            .map(|_| Arc::clone(&uploader))
            .collect();
        self.run(uploaders).await
    }

    /// Runs the pool until the backlog is drained, one uploader per worker.
    pub async fn run(self, uploaders: Vec<Arc<dyn Uploader>>) -> Result<RunSummary, DispatchError> {
        let pool_size = self.config.workers;
        if pool_size == 0 {
            return Err(DispatchError::ZeroWorkers);
        }
        if uploaders.len() != pool_size {
            return Err(DispatchError::WorkerCountMismatch {
                expected: pool_size,
                actual: uploaders.len(),
            });
        }

        let run_id = Uuid::new_v4();
        info!(
            "Starting upload run {}: {} files, {} workers",
            run_id, self.total, pool_size
        );

        let workers = self.prepare_workers(run_id, uploaders).await;
        let aborted = self.start_and_join(workers).await;

        let summary = self.finish(run_id).await;
        if !aborted.is_empty() {
            error!("Upload run {} lost workers {:?}", run_id, aborted);
            return Err(DispatchError::WorkerAborted { workers: aborted });
        }

        Ok(summary)
    }

    /// Builds the pool and hands each worker its first item.
    ///
    /// No worker is running yet, so the lock is uncontended here.
    async fn prepare_workers(
        &self,
        run_id: Uuid,
        uploaders: Vec<Arc<dyn Uploader>>,
    ) -> Vec<Worker> {
        let handler: Arc<dyn CompletionHandler> = self.dispatcher.clone();
        let mut state = self.dispatcher.state.lock().await;

        self.dispatcher.reporter.on_start(&RunStart {
            run_id,
            total: self.total,
            workers: uploaders.len(),
            files: state.backlog.pending().map(|i| i.path().to_path_buf()).collect(),
        });

        uploaders
            .into_iter()
            .enumerate()
            .map(|(id, uploader)| {
                let mut worker = Worker::new(id, uploader);
                if !self.dispatcher.cancel.is_cancelled() {
                    if let Some(item) = state.backlog.take() {
                        worker.assign(item, Arc::clone(&handler));
                    }
                }
                worker
            })
            .collect()
    }

    /// Spawns every busy worker and waits for all of them.
    ///
    /// Returns the ids of workers whose task did not complete normally.
    async fn start_and_join(&self, workers: Vec<Worker>) -> Vec<WorkerId> {
        let stagger = Duration::from_millis(self.config.start_stagger_ms);
        let mut handles = Vec::with_capacity(workers.len());

        for worker in workers {
            if worker.is_idle() {
                debug!("Worker {} has nothing to do", worker.id());
                continue;
            }
            if !handles.is_empty() && !stagger.is_zero() {
                tokio::time::sleep(stagger).await;
            }
            let id = worker.id();
            handles.push((id, tokio::spawn(worker.run())));
        }

        let mut aborted = Vec::new();
        for (id, handle) in handles {
            match handle.await {
                Ok(processed) => debug!("Worker {} processed {} items", id, processed),
                Err(e) => {
                    error!("Worker {} ended abnormally: {}", id, e);
                    aborted.push(id);
                }
            }
        }
        aborted
    }

    async fn finish(&self, run_id: Uuid) -> RunSummary {
        let mut state = self.dispatcher.state.lock().await;
        let ledger = mem::replace(&mut state.ledger, Ledger::new(0));
        let skipped = state.backlog.len();
        drop(state);

        let summary = RunSummary {
            run_id,
            total: self.total,
            succeeded: ledger.succeeded_count(),
            failed: ledger.failed_count(),
            skipped,
            cancelled: self.dispatcher.cancel.is_cancelled(),
            outcomes: ledger.into_outcomes(),
        };

        info!(
            "Upload run {} finished: {} sent, {} failed, {} skipped of {}",
            run_id, summary.succeeded, summary.failed, summary.skipped, summary.total
        );
        self.dispatcher.reporter.on_finish(&summary);

        summary
    }
}
