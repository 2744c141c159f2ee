pub mod config;
pub mod discovery;
pub mod dispatch;
pub mod reporter;
pub mod testing;
pub mod uploader;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, OutputConfig,
    SanitizedConfig, UploadConfig,
};
pub use discovery::{discover_files, DiscoveryConfig, DiscoveryError};
pub use dispatch::{
    Backlog, CancelHandle, DispatchConfig, DispatchError, Ledger, LedgerSnapshot, Outcome,
    RunStart, RunSummary, Supervisor, UploadContext, WorkItem, WorkerId,
};
pub use reporter::{ConsoleReporter, NullReporter, Reporter, ReporterError, Verbosity};
pub use uploader::{HttpUploader, HttpUploaderConfig, UploadError, Uploader};
