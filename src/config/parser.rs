use crate::config::types::Config;
use crate::config::validation::validate_config;
use crate::config::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// Missing keys fall back to their documented defaults, so a partial
/// configuration file is valid.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use ipfs_trawler::config::load_config;
///
/// let config = load_config(Path::new("trawler.toml")).unwrap();
/// println!("Hash workers: {}", config.workers.hash_workers);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    // Read the configuration file
    let content = std::fs::read_to_string(path)?;

    // Parse TOML
    let config: Config = toml::from_str(&content)?;

    // Validate the configuration
    validate_config(&config)?;

    Ok(config)
}
