//! Configuration module for ipfs-trawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every option has a default, so a partial (or absent) configuration file works.
//!
//! # Example
//!
//! ```no_run
//! use ipfs_trawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("trawler.toml")).unwrap();
//! println!("Hash workers: {}", config.workers.hash_workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, ExtractorConfig, IndexConfig, IpfsConfig, LimitsConfig, QueueConfig, WorkersConfig,
};

// Re-export parser functions
pub use parser::load_config;
pub use validation::validate_config;

use thiserror::Error;

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
