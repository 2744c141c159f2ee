//! Upload worker.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tracing::{debug, warn};

use crate::uploader::{UploadError, Uploader};

use super::item::{Outcome, WorkItem, WorkerId};

/// Receives each finished outcome and hands back the worker's next item.
///
/// Called synchronously from inside [`Worker::run`], on the worker's own task.
/// Returning `None` leaves the worker idle, which ends its run loop.
#[async_trait]
pub trait CompletionHandler: Send + Sync {
    async fn on_complete(&self, worker: WorkerId, outcome: Outcome) -> Option<WorkItem>;
}

/// Processes one item at a time until no further item is assigned.
pub struct Worker {
    id: WorkerId,
    uploader: Arc<dyn Uploader>,
    assignment: Option<(WorkItem, Arc<dyn CompletionHandler>)>,
}

impl Worker {
    pub fn new(id: WorkerId, uploader: Arc<dyn Uploader>) -> Self {
        Self {
            id,
            uploader,
            assignment: None,
        }
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn is_idle(&self) -> bool {
        self.assignment.is_none()
    }

    /// Installs the next item and the handler to call once it is done.
    ///
    /// Only valid on an idle worker.
    pub fn assign(&mut self, item: WorkItem, on_complete: Arc<dyn CompletionHandler>) {
        debug_assert!(self.is_idle(), "worker {} assigned while busy", self.id);
        debug!(
            "Worker {} assigned {} via {}",
            self.id,
            item,
            self.uploader.name()
        );
        self.assignment = Some((item, on_complete));
    }

    /// Runs until the completion handler stops handing out items.
    ///
    /// Returns the number of items this worker processed.
    pub async fn run(mut self) -> usize {
        let mut processed = 0;

        while let Some((item, on_complete)) = self.assignment.take() {
            let outcome = self.process(&item).await;
            processed += 1;

            if let Some(next) = on_complete.on_complete(self.id, outcome).await {
                self.assign(next, on_complete);
            }
        }

        debug!("Worker {} finished after {} items", self.id, processed);
        processed
    }

    /// Uploads one item. Never fails: errors and panics become failed outcomes.
    async fn process(&self, item: &WorkItem) -> Outcome {
        let context = item.context();
        let upload = self.uploader.upload(
            &context.source_id,
            item.path(),
            context.timestamp_reception,
        );

        let result = match AssertUnwindSafe(upload).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => Err(UploadError::Panicked(panic_message(panic.as_ref()))),
        };

        match result {
            Ok(payload) => Outcome::success(item, self.id, payload),
            Err(e) => {
                warn!(
                    "Worker {} ({} uploader) failed to upload {}: {}",
                    self.id,
                    self.uploader.name(),
                    item,
                    e
                );
                Outcome::failure(item, self.id, e)
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::UploadContext;
    use crate::testing::MockUploader;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Hands out items from a fixed list and records every outcome.
    struct ListHandler {
        next: Mutex<Vec<WorkItem>>,
        seen: Mutex<Vec<Outcome>>,
    }

    impl ListHandler {
        fn new(items: Vec<WorkItem>) -> Arc<Self> {
            Arc::new(Self {
                next: Mutex::new(items),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionHandler for ListHandler {
        async fn on_complete(&self, _worker: WorkerId, outcome: Outcome) -> Option<WorkItem> {
            self.seen.lock().unwrap().push(outcome);
            self.next.lock().unwrap().pop()
        }
    }

    fn item(path: &str) -> WorkItem {
        WorkItem::new(path, Arc::new(UploadContext::new("src", None)))
    }

    #[tokio::test]
    async fn test_idle_worker_returns_immediately() {
        let worker = Worker::new(0, Arc::new(MockUploader::new()));
        assert!(worker.is_idle());
        assert_eq!(worker.run().await, 0);
    }

    #[tokio::test]
    async fn test_worker_loops_until_handler_returns_none() {
        let uploader = Arc::new(MockUploader::new());
        let handler = ListHandler::new(vec![item("b.pdf"), item("c.pdf")]);

        let mut worker = Worker::new(3, uploader.clone());
        worker.assign(item("a.pdf"), handler.clone());

        assert_eq!(worker.run().await, 3);

        let seen = handler.seen.lock().unwrap();
        let paths: Vec<PathBuf> = seen.iter().map(|o| o.path().to_path_buf()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("a.pdf"),
                PathBuf::from("c.pdf"),
                PathBuf::from("b.pdf")
            ]
        );
        assert!(seen.iter().all(|o| o.worker_id() == 3 && o.succeeded()));
        assert_eq!(uploader.upload_count().await, 3);
    }

    #[tokio::test]
    async fn test_upload_error_becomes_failed_outcome() {
        let uploader = Arc::new(MockUploader::new());
        uploader.fail_path("bad.pdf").await;
        let handler = ListHandler::new(vec![item("good.pdf")]);

        let mut worker = Worker::new(0, uploader);
        worker.assign(item("bad.pdf"), handler.clone());
        assert_eq!(worker.run().await, 2);

        let seen = handler.seen.lock().unwrap();
        assert!(!seen[0].succeeded());
        assert!(seen[1].succeeded());
    }

    #[tokio::test]
    async fn test_upload_panic_becomes_failed_outcome() {
        let uploader = Arc::new(MockUploader::new());
        uploader.panic_on_path("boom.pdf").await;
        let handler = ListHandler::new(vec![item("after.pdf")]);

        let mut worker = Worker::new(1, uploader);
        worker.assign(item("boom.pdf"), handler.clone());
        assert_eq!(worker.run().await, 2);

        let seen = handler.seen.lock().unwrap();
        assert!(!seen[0].succeeded());
        assert!(seen[0]
            .detail()
            .as_str()
            .unwrap()
            .contains("Upload panicked"));
        assert!(seen[1].succeeded());
    }
}
