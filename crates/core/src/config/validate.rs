use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - API key, base URL and source id are set
/// - At least one worker
/// - Request timeout is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.api.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "api.api_key is required".to_string(),
        ));
    }

    if config.api.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "api.base_url cannot be empty".to_string(),
        ));
    }

    if config.api.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "api.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.upload.source_id.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "upload.source_id is required".to_string(),
        ));
    }

    if config.dispatch.workers == 0 {
        return Err(ConfigError::ValidationError(
            "dispatch.workers must be at least 1".to_string(),
        ));
    }

    Ok(())
}
