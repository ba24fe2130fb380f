use crate::config::types::RunConfig;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and validates a run configuration from a TOML file.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use site_mirror::config::load_config;
///
/// let config = load_config(Path::new("clone.toml")).unwrap();
/// println!("Cloning {} (max {} pages)", config.target_url, config.max_pages);
/// ```
pub fn load_config(path: &Path) -> Result<RunConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: RunConfig = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}
