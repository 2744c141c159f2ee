//! Mock uploader for testing.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::uploader::{UploadError, Uploader};

/// A recorded upload call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedUpload {
    pub source_id: String,
    pub path: PathBuf,
    pub timestamp_reception: Option<DateTime<Utc>>,
}

/// Mock implementation of the Uploader trait.
///
/// Provides controllable behavior for testing:
/// - Record every upload call
/// - Reject or panic on chosen paths
/// - Simulate latency
/// - Track how many uploads run at the same time
///
/// # Example
///
/// ```rust,ignore
/// use importer_core::testing::MockUploader;
///
/// let uploader = MockUploader::new();
/// uploader.fail_path("/cv/broken.pdf").await;
/// uploader.set_latency(Duration::from_millis(5)).await;
///
/// let summary = supervisor.run_shared(Arc::new(uploader.clone())).await?;
/// assert_eq!(uploader.upload_count().await, summary.total);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockUploader {
    /// Recorded uploads, in call order.
    uploads: Arc<RwLock<Vec<RecordedUpload>>>,
    /// Paths that get rejected.
    failing_paths: Arc<RwLock<HashSet<PathBuf>>>,
    /// Paths whose upload panics.
    panicking_paths: Arc<RwLock<HashSet<PathBuf>>>,
    /// Simulated upload duration.
    latency: Arc<RwLock<Duration>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

/// Decrements the in-flight counter even if the upload panics.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockUploader {
    /// Create a new mock uploader that accepts everything instantly.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock uploader with a fixed latency.
    pub async fn with_latency(latency: Duration) -> Self {
        let uploader = Self::new();
        uploader.set_latency(latency).await;
        uploader
    }

    /// Reject uploads of `path`.
    pub async fn fail_path(&self, path: impl Into<PathBuf>) {
        self.failing_paths.write().await.insert(path.into());
    }

    /// Panic while uploading `path`.
    pub async fn panic_on_path(&self, path: impl Into<PathBuf>) {
        self.panicking_paths.write().await.insert(path.into());
    }

    /// Set the simulated upload duration.
    pub async fn set_latency(&self, latency: Duration) {
        *self.latency.write().await = latency;
    }

    /// Get all recorded uploads.
    pub async fn recorded_uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.read().await.clone()
    }

    /// Get the number of upload calls.
    pub async fn upload_count(&self) -> usize {
        self.uploads.read().await.len()
    }

    /// Highest number of uploads observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Uploader for MockUploader {
    fn name(&self) -> &str {
        "mock"
    }

    async fn upload(
        &self,
        source_id: &str,
        path: &Path,
        timestamp_reception: Option<DateTime<Utc>>,
    ) -> Result<Value, UploadError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        self.uploads.write().await.push(RecordedUpload {
            source_id: source_id.to_string(),
            path: path.to_path_buf(),
            timestamp_reception,
        });

        let latency = *self.latency.read().await;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let panics = self.panicking_paths.read().await.contains(path);
        if panics {
            panic!("mock upload panic for {}", path.display());
        }

        let fails = self.failing_paths.read().await.contains(path);
        if fails {
            return Err(UploadError::Rejected {
                code: 400,
                body: json!({"code": 400, "message": "mock rejection"}),
            });
        }

        Ok(json!({
            "code": 201,
            "message": "mock upload",
            "data": {"file": path.display().to_string(), "source_id": source_id},
        }))
    }
}
