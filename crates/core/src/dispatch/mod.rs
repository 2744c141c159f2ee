//! Dispatch module: the work-distribution and result-aggregation engine.
//!
//! A [`Supervisor`] owns the [`Backlog`] and the [`Ledger`] and runs a fixed
//! pool of [`Worker`]s. Workers never touch the shared state themselves; each
//! finished upload goes through the supervisor's completion handler, which
//! records the outcome, hands the same worker its next item and notifies the
//! reporter, all under one lock.
//!
//! # Example
//!
//! ```ignore
//! use importer_core::dispatch::{Backlog, DispatchConfig, Supervisor, UploadContext};
//!
//! let backlog = Backlog::new(files, UploadContext::new("source-id", None));
//! let supervisor = Supervisor::new(DispatchConfig::default(), backlog, reporter);
//! let summary = supervisor.run_shared(uploader).await?;
//! println!("{} failed", summary.failed);
//! ```

mod backlog;
mod config;
mod item;
mod ledger;
mod supervisor;
mod types;
mod worker;

pub use backlog::Backlog;
pub use config::DispatchConfig;
pub use item::{Outcome, UploadContext, WorkItem, WorkerId};
pub use ledger::{Ledger, LedgerSnapshot};
pub use supervisor::Supervisor;
pub use types::{CancelHandle, DispatchError, RunStart, RunSummary};
pub use worker::{CompletionHandler, Worker};
