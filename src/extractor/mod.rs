//! Metadata extractor client
//!
//! Talks to the ipfs-tika bridge, which fetches content from the node
//! itself and returns extracted metadata (title, content, mimetype, ...)
//! as a JSON object.

use crate::config::ExtractorConfig;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur fetching metadata
#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("Undesired status '{status}' from extractor for {path}")]
    Status { status: u16, path: String },

    #[error("Extractor response decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Extractor transport error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Client for the metadata extractor service
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Creates an extractor client from configuration
    pub fn new(config: &ExtractorConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.tika_url.trim_end_matches('/').to_string(),
        })
    }

    /// Extracts metadata for content under a path of the form
    /// `/ipfs/<hash>[/<name>]`
    ///
    /// The path, not raw bytes, is handed to the extractor; keeping the
    /// filename in the path preserves extension hints for type detection.
    pub async fn extract(&self, path: &str) -> Result<Map<String, Value>, ExtractorError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if status.as_u16() != 200 {
            return Err(ExtractorError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        let body = response.text().await?;
        let metadata: Map<String, Value> = serde_json::from_str(&body)?;

        Ok(metadata)
    }
}
