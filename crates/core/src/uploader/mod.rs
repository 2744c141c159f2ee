//! Uploader module: the only I/O the dispatch engine performs.
//!
//! The [`Uploader`] trait is the seam between the dispatch engine and the
//! remote ingestion API. [`HttpUploader`] posts files to the profile endpoint
//! as multipart forms; tests use [`crate::testing::MockUploader`].

mod error;
mod http;
mod traits;

pub use error::UploadError;
pub use http::{HttpUploader, HttpUploaderConfig};
pub use traits::Uploader;
