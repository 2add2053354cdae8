//! Search index client
//!
//! This module talks to the Elasticsearch backend holding crawled documents.
//! Documents are keyed by hash; writes are idempotent upserts that merge
//! properties into the existing document, creating it when absent.

mod client;
mod types;

pub use client::Client;
pub use types::{Reference, StoredReferences};

use thiserror::Error;

/// Errors that can occur talking to the index backend
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Index transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Index returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Index response decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;
