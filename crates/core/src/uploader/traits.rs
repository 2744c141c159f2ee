//! Trait definitions for the uploader module.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::error::UploadError;

/// Sends one file to the remote ingestion endpoint.
///
/// May take arbitrarily long; the dispatch engine imposes no timeout of its
/// own. Each worker owns its own uploader handle.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Returns the name of this uploader implementation.
    fn name(&self) -> &str;

    /// Uploads `path` into `source_id`, returning the response payload.
    async fn upload(
        &self,
        source_id: &str,
        path: &Path,
        timestamp_reception: Option<DateTime<Utc>>,
    ) -> Result<Value, UploadError>;
}
