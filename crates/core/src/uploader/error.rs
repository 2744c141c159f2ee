//! Error types for the uploader module.

use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while uploading one file.
///
/// None of them stop a run: the worker turns every error into a failed
/// outcome and moves on to the next item.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Transport-level failure (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered but did not accept the file.
    #[error("Invalid response: {body}")]
    Rejected { code: u16, body: Value },

    /// The API answered with something that is not the expected JSON.
    #[error("Unreadable response (status {status}): {message}")]
    InvalidResponse { status: u16, message: String },

    /// The upload future panicked.
    #[error("Upload panicked: {0}")]
    Panicked(String),
}

impl UploadError {
    /// Status or API code attached to the error, if the server answered.
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Rejected { code, .. } => Some(*code),
            Self::InvalidResponse { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Io { .. } | Self::Panicked(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejected_message_contains_body() {
        let err = UploadError::Rejected {
            code: 400,
            body: json!({"code": 400, "message": "bad source"}),
        };
        assert!(err.to_string().contains("bad source"));
        assert_eq!(err.code(), Some(400));
    }

    #[test]
    fn test_io_error_has_no_code() {
        let err = UploadError::Io {
            path: PathBuf::from("/missing.pdf"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("/missing.pdf"));
        assert_eq!(err.code(), None);
    }
}
