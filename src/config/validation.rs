use crate::config::types::{Config, LimitsConfig, WorkersConfig};
use crate::config::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    validate_workers_config(&config.workers)?;
    validate_limits_config(&config.limits)?;
    validate_endpoint(&config.ipfs.api_url, "ipfs.api-url")?;
    validate_endpoint(&config.index.elasticsearch_url, "index.elasticsearch-url")?;
    validate_endpoint(&config.extractor.tika_url, "extractor.tika-url")?;
    validate_endpoint(&config.queue.amqp_url, "queue.amqp-url")?;

    if config.index.name.is_empty() {
        return Err(ConfigError::Validation(
            "index.name cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates worker pool configuration
fn validate_workers_config(config: &WorkersConfig) -> Result<(), ConfigError> {
    if config.hash_workers < 1 {
        return Err(ConfigError::Validation(format!(
            "hash-workers must be >= 1, got {}",
            config.hash_workers
        )));
    }

    if config.file_workers < 1 {
        return Err(ConfigError::Validation(format!(
            "file-workers must be >= 1, got {}",
            config.file_workers
        )));
    }

    Ok(())
}

/// Validates crawl limits
fn validate_limits_config(config: &LimitsConfig) -> Result<(), ConfigError> {
    if config.metadata_max_size == 0 {
        return Err(ConfigError::Validation(
            "metadata-max-size must be > 0".to_string(),
        ));
    }

    if config.partial_size == 0 {
        return Err(ConfigError::Validation(
            "partial-size must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates that an endpoint string parses as a URL
fn validate_endpoint(endpoint: &str, key: &str) -> Result<(), ConfigError> {
    Url::parse(endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", key, e)))?;
    Ok(())
}
