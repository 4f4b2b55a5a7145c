use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Vision section exists (enforced by serde)
/// - Server port is not 0
/// - Model name and base URL are not blank
/// - Upload limits are non-zero and consistent
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Vision endpoint validation
    if config.vision.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "vision.base_url cannot be blank".to_string(),
        ));
    }
    if config.vision.model.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "vision.model cannot be blank".to_string(),
        ));
    }

    // Limit validation
    if config.limits.max_upload_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "limits.max_upload_bytes cannot be 0".to_string(),
        ));
    }
    if config.limits.max_sync_upload_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "limits.max_sync_upload_bytes cannot be 0".to_string(),
        ));
    }
    if config.limits.max_sync_upload_bytes > config.limits.max_upload_bytes {
        return Err(ConfigError::ValidationError(
            "limits.max_sync_upload_bytes cannot exceed limits.max_upload_bytes".to_string(),
        ));
    }

    if config.tasks.max_records == 0 {
        return Err(ConfigError::ValidationError(
            "tasks.max_records cannot be 0".to_string(),
        ));
    }

    Ok(())
}
