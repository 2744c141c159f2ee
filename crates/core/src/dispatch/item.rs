//! Work items and upload outcomes.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Index of a worker inside the pool.
pub type WorkerId = usize;

/// Upload parameters shared by every item of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadContext {
    /// Target collection (source) the files are uploaded into.
    pub source_id: String,
    /// Reception timestamp attached to every upload, if any.
    pub timestamp_reception: Option<DateTime<Utc>>,
}

impl UploadContext {
    pub fn new(source_id: impl Into<String>, timestamp_reception: Option<DateTime<Utc>>) -> Self {
        Self {
            source_id: source_id.into(),
            timestamp_reception,
        }
    }
}

/// One file waiting to be uploaded.
#[derive(Debug, Clone)]
pub struct WorkItem {
    path: PathBuf,
    context: Arc<UploadContext>,
}

impl WorkItem {
    pub fn new(path: impl Into<PathBuf>, context: Arc<UploadContext>) -> Self {
        Self {
            path: path.into(),
            context,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn context(&self) -> &UploadContext {
        &self.context
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Result of a single upload attempt.
///
/// Built once by the worker that processed the item and never mutated after.
/// `detail` carries the response payload on success and the error message on
/// failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    path: PathBuf,
    worker_id: WorkerId,
    succeeded: bool,
    detail: Value,
}

/// Line written for one finished file by the reporters.
#[derive(Debug, Serialize)]
struct ReportLine<'a> {
    file: String,
    sent: bool,
    result: &'a Value,
}

impl Outcome {
    pub fn success(item: &WorkItem, worker_id: WorkerId, payload: Value) -> Self {
        Self {
            path: item.path.clone(),
            worker_id,
            succeeded: true,
            detail: payload,
        }
    }

    pub fn failure(item: &WorkItem, worker_id: WorkerId, error: impl fmt::Display) -> Self {
        Self {
            path: item.path.clone(),
            worker_id,
            succeeded: false,
            detail: Value::String(error.to_string()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn worker_id(&self) -> WorkerId {
        self.worker_id
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    pub fn detail(&self) -> &Value {
        &self.detail
    }

    /// Renders the outcome as a single JSON object line.
    pub fn to_report_line(&self) -> String {
        let line = ReportLine {
            file: self.path.display().to_string(),
            sent: self.succeeded,
            result: &self.detail,
        };
        serde_json::to_string(&line).unwrap_or_else(|_| {
            format!("{{\"file\":{:?},\"sent\":{}}}", line.file, line.sent)
        })
    }
}
