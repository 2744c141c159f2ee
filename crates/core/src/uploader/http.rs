//! Profile ingestion API client.
//!
//! Files are posted as multipart forms to `{base_url}/profile`. The API wraps
//! every answer in a JSON envelope whose `code` field must be 200 or 201 for
//! the upload to count as accepted.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::error::UploadError;
use super::traits::Uploader;

/// HTTP uploader configuration (the `[api]` config section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpUploaderConfig {
    /// API base URL, without the `/profile` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key sent in the `X-API-Key` header.
    #[serde(default)]
    pub api_key: String,
    /// Request timeout in seconds (default: 120).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://www.riminder.net/sf/public/api/v1.0".to_string()
}

fn default_timeout() -> u64 {
    120
}

impl Default for HttpUploaderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Uploads files to the profile ingestion endpoint.
pub struct HttpUploader {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpUploader {
    /// Create a new uploader with its own connection pool.
    pub fn new(config: &HttpUploaderConfig) -> Result<Self, UploadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/profile", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
        })
    }

    async fn build_form(
        source_id: &str,
        path: &Path,
        timestamp_reception: Option<DateTime<Utc>>,
    ) -> Result<Form, UploadError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| UploadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "resume".to_string());

        let mut form = Form::new()
            .text("source_id", source_id.to_string())
            .part("file", Part::bytes(bytes).file_name(file_name));

        if let Some(ts) = timestamp_reception {
            form = form.text("timestamp_reception", ts.timestamp().to_string());
        }

        Ok(form)
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    fn name(&self) -> &str {
        "http"
    }

    async fn upload(
        &self,
        source_id: &str,
        path: &Path,
        timestamp_reception: Option<DateTime<Utc>>,
    ) -> Result<Value, UploadError> {
        let form = Self::build_form(source_id, path, timestamp_reception).await?;

        debug!("Uploading {} to {}", path.display(), self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-Key", &self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        let body: Value =
            serde_json::from_str(&text).map_err(|_| UploadError::InvalidResponse {
                status: status.as_u16(),
                message: text.clone(),
            })?;

        let code = body
            .get("code")
            .and_then(Value::as_u64)
            .unwrap_or_else(|| u64::from(status.as_u16()));

        if status.is_success() && (code == 200 || code == 201) {
            Ok(body)
        } else {
            // Codes that do not fit a status are reported under the HTTP status
            let code = u16::try_from(code).unwrap_or_else(|_| status.as_u16());
            Err(UploadError::Rejected { code, body })
        }
    }
}
