use crate::config::types::{CloneMode, RunConfig};
use crate::url::TargetOrigin;
use crate::ConfigError;

/// Validates a run configuration before any network activity.
///
/// This is the only error that aborts a run outright; every later failure is
/// recorded per URL and the run continues.
pub fn validate(config: &RunConfig) -> Result<(), ConfigError> {
    TargetOrigin::parse(&config.target_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", config.target_url, e)))?;

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.max_depth < 1 || config.max_depth > 10 {
        return Err(ConfigError::Validation(format!(
            "max_depth must be between 1 and 10, got {}",
            config.max_depth
        )));
    }

    if config.mode == CloneMode::CustomUrls && config.custom_urls.is_empty() {
        return Err(ConfigError::Validation(
            "custom-urls mode requires at least one URL".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}
