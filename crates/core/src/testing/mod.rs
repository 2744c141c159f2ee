//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the collaborator traits,
//! allowing the dispatch engine to be exercised without a real ingestion API.
//!
//! # Example
//!
//! ```rust,ignore
//! use importer_core::testing::{fixtures, MockUploader, RecordingReporter};
//!
//! let uploader = MockUploader::new();
//! let reporter = Arc::new(RecordingReporter::new());
//! let backlog = fixtures::backlog(&["a.pdf", "b.pdf"]);
//! ```

mod mock_uploader;
mod recording_reporter;

pub use mock_uploader::{MockUploader, RecordedUpload};
pub use recording_reporter::RecordingReporter;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::PathBuf;

    use crate::dispatch::{Backlog, UploadContext};

    /// Source id used by the fixtures.
    pub const SOURCE_ID: &str = "test-source";

    /// Create a backlog from file names with the fixture upload context.
    pub fn backlog(names: &[&str]) -> Backlog {
        Backlog::new(
            names.iter().map(PathBuf::from),
            UploadContext::new(SOURCE_ID, None),
        )
    }

    /// Create a backlog of `n` generated resume paths.
    pub fn numbered_backlog(n: usize) -> Backlog {
        Backlog::new(
            (0..n).map(|i| PathBuf::from(format!("/resumes/cv-{i:03}.pdf"))),
            UploadContext::new(SOURCE_ID, None),
        )
    }
}
