use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Parser;

use importer_core::{Config, Verbosity};

#[derive(Parser, Debug)]
#[command(name = "resume-import", version, about = "Send resumes to the platform")]
pub struct Args {
    /// Files or directories to upload
    #[arg(long, num_args = 1.., required = true, value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Source the profiles are added to
    #[arg(long, alias = "source_id")]
    pub source_id: Option<String>,

    /// API key for the ingestion API
    #[arg(long, alias = "api_key")]
    pub api_key: Option<String>,

    /// API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Reception timestamp for every file (RFC 3339 or unix seconds)
    #[arg(long, alias = "timestamp_reception", value_parser = parse_timestamp)]
    pub timestamp_reception: Option<DateTime<Utc>>,

    /// Print one line per file and every result at the end
    #[arg(long, conflicts_with = "silent")]
    pub verbose: bool,

    /// Print nothing
    #[arg(long)]
    pub silent: bool,

    /// Number of concurrent upload workers
    #[arg(long = "n-worker", alias = "workers", value_name = "N")]
    pub n_worker: Option<usize>,

    /// Mirror per-file results into this file (verbose mode)
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Configuration file (defaults to $RESUME_IMPORTER_CONFIG if set)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Overrides file and environment settings with command-line values.
    pub fn apply(&self, config: &mut Config) {
        if self.recursive {
            config.discovery.recursive = true;
        }
        if let Some(source_id) = &self.source_id {
            config.upload.source_id = source_id.clone();
        }
        if let Some(api_key) = &self.api_key {
            config.api.api_key = api_key.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.api.base_url = base_url.clone();
        }
        if self.timestamp_reception.is_some() {
            config.upload.timestamp_reception = self.timestamp_reception;
        }
        if let Some(workers) = self.n_worker {
            config.dispatch.workers = workers;
        }
        if let Some(log_file) = &self.log_file {
            config.output.log_file = Some(log_file.clone());
        }
        if self.silent {
            config.output.verbosity = Verbosity::Silent;
        } else if self.verbose {
            config.output.verbosity = Verbosity::Verbose;
        }
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(secs) = value.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| format!("timestamp out of range: {value}"));
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid timestamp '{value}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_args() {
        let args = Args::try_parse_from(["resume-import", "--paths", "a.pdf", "dir"]).unwrap();
        assert_eq!(args.paths, vec![PathBuf::from("a.pdf"), PathBuf::from("dir")]);
        assert!(!args.recursive);
        assert!(args.n_worker.is_none());
    }

    #[test]
    fn test_paths_required() {
        assert!(Args::try_parse_from(["resume-import", "--source-id", "s"]).is_err());
    }

    #[test]
    fn test_verbose_conflicts_with_silent() {
        let result =
            Args::try_parse_from(["resume-import", "--paths", "a", "--verbose", "--silent"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let args = Args::try_parse_from([
            "resume-import",
            "--paths",
            "cvs",
            "-r",
            "--source_id",
            "src",
            "--api-key",
            "key",
            "--n-worker",
            "5",
            "--timestamp-reception",
            "1709287200",
            "--verbose",
        ])
        .unwrap();

        let mut config = Config::default();
        args.apply(&mut config);

        assert!(config.discovery.recursive);
        assert_eq!(config.upload.source_id, "src");
        assert_eq!(config.api.api_key, "key");
        assert_eq!(config.dispatch.workers, 5);
        assert_eq!(config.output.verbosity, Verbosity::Verbose);
        assert_eq!(
            config.upload.timestamp_reception.unwrap().to_rfc3339(),
            "2024-03-01T10:00:00+00:00"
        );
    }

    #[test]
    fn test_apply_keeps_config_values() {
        let args = Args::try_parse_from(["resume-import", "--paths", "cvs"]).unwrap();
        let mut config = Config::default();
        config.dispatch.workers = 7;
        config.output.verbosity = Verbosity::Silent;

        args.apply(&mut config);

        assert_eq!(config.dispatch.workers, 7);
        assert_eq!(config.output.verbosity, Verbosity::Silent);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert_eq!(parse_timestamp("0").unwrap().timestamp(), 0);
        assert_eq!(
            parse_timestamp("2024-03-01T11:00:00+01:00").unwrap().timestamp(),
            1_709_287_200
        );
        assert!(parse_timestamp("yesterday").is_err());
    }
}
