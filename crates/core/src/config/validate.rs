use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Staging and output directories are distinct non-empty paths
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.reports.staging_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "reports.staging_dir cannot be empty".to_string(),
        ));
    }

    if config.reports.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "reports.output_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}
