mod args;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use importer_core::{
    discover_files, load_config, validate_config, Backlog, CancelHandle, ConsoleReporter,
    HttpUploader, Reporter, SanitizedConfig, Supervisor, Uploader,
};

use args::Args;

/// Exit code when the run finished but some files were not sent.
const EXIT_INCOMPLETE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            error!("Fatal error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode> {
    // Logs go to stderr so they never break the progress bar on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Usage errors are fatal (1); 2 is reserved for incomplete runs
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => e.exit(),
    };

    let config_path = args
        .config
        .clone()
        .or_else(|| std::env::var("RESUME_IMPORTER_CONFIG").ok().map(PathBuf::from));

    let mut config = load_config(config_path.as_deref())
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    args.apply(&mut config);

    validate_config(&config).context("Configuration validation failed")?;

    info!(
        "Configuration: {}",
        serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default()
    );

    let files = discover_files(&args.paths, &config.discovery).context("Failed to collect files")?;
    info!("Discovered {} files", files.len());
    let backlog = Backlog::new(files, config.upload_context());

    let mut reporter = ConsoleReporter::new(config.output.verbosity);
    if let Some(log_file) = &config.output.log_file {
        reporter = reporter
            .with_log_file(log_file)
            .context("Failed to set up log file")?;
    }
    let reporter: Arc<dyn Reporter> = Arc::new(reporter);

    // One uploader, and so one connection pool, per worker
    let uploaders = (0..config.dispatch.workers)
        .map(|_| HttpUploader::new(&config.api).map(|u| Arc::new(u) as Arc<dyn Uploader>))
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to create HTTP client")?;

    let supervisor = Supervisor::new(config.dispatch.clone(), backlog, reporter);
    let cancel_task = tokio::spawn(cancel_on_interrupt(supervisor.cancel_handle()));

    let summary = supervisor.run(uploaders).await.context("Upload run failed")?;
    cancel_task.abort();

    if summary.failed > 0 || summary.cancelled {
        return Ok(ExitCode::from(EXIT_INCOMPLETE));
    }
    Ok(ExitCode::SUCCESS)
}

/// Stops handing out files on Ctrl+C; uploads in flight still complete.
async fn cancel_on_interrupt(cancel: CancelHandle) {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to install Ctrl+C handler: {}", e);
        return;
    }
    warn!("Interrupted, waiting for uploads in flight");
    cancel.cancel();
}
