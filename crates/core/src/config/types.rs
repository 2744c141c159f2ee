use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::discovery::DiscoveryConfig;
use crate::dispatch::{DispatchConfig, UploadContext};
use crate::reporter::Verbosity;
use crate::uploader::HttpUploaderConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: HttpUploaderConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Upload parameters shared by every file of the run.
    pub fn upload_context(&self) -> UploadContext {
        UploadContext::new(self.upload.source_id.clone(), self.upload.timestamp_reception)
    }
}

/// Upload target configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UploadConfig {
    /// Source (collection) the profiles are added to.
    #[serde(default)]
    pub source_id: String,
    /// Reception timestamp attached to every upload (RFC 3339).
    #[serde(default)]
    pub timestamp_reception: Option<DateTime<Utc>>,
}

/// Terminal output configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub verbosity: Verbosity,
    /// Log file mirroring per-file results in verbose mode.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub api: SanitizedApiConfig,
    pub upload: UploadConfig,
    pub dispatch: DispatchConfig,
    pub discovery: DiscoveryConfig,
    pub output: OutputConfig,
}

/// Sanitized API config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedApiConfig {
    pub base_url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            api: SanitizedApiConfig {
                base_url: config.api.base_url.clone(),
                api_key_configured: !config.api.api_key.is_empty(),
                timeout_secs: config.api.timeout_secs,
            },
            upload: config.upload.clone(),
            dispatch: config.dispatch.clone(),
            discovery: config.discovery.clone(),
            output: config.output.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[api]
base_url = "http://localhost:8000/v1.0"
api_key = "secret"
timeout_secs = 10

[upload]
source_id = "src-42"
timestamp_reception = "2024-03-01T10:00:00Z"

[dispatch]
workers = 8
start_stagger_ms = 0

[discovery]
recursive = true
extensions = [".pdf"]

[output]
verbosity = "silent"
log_file = "/tmp/import.log"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.dispatch.workers, 8);
        assert_eq!(config.discovery.extensions, vec![".pdf".to_string()]);
        assert_eq!(config.output.verbosity, Verbosity::Silent);
        assert_eq!(
            config.upload.timestamp_reception.unwrap().timestamp(),
            1_709_287_200
        );
    }

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.dispatch.workers, 3);
        assert_eq!(config.api.timeout_secs, 120);
        assert!(!config.discovery.recursive);
        assert_eq!(config.output.verbosity, Verbosity::Normal);
        assert!(config.upload.timestamp_reception.is_none());
    }

    #[test]
    fn test_upload_context() {
        let mut config = Config::default();
        config.upload.source_id = "src".to_string();
        let context = config.upload_context();
        assert_eq!(context.source_id, "src");
        assert!(context.timestamp_reception.is_none());
    }

    #[test]
    fn test_sanitized_config() {
        let mut config = Config::default();
        config.api.api_key = "very-secret".to_string();

        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.api.api_key_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("very-secret"));
    }
}
