//! Crawl engine - per-task crawl logic
//!
//! This module contains the logic applied to a single task pulled off a
//! queue:
//! - Reference deduplication against the index, making redelivery idempotent
//! - The hash crawl: list a hash, then enqueue it as a file or fan out its
//!   directory links as child tasks
//! - The file crawl: size gating, metadata extraction, and indexing
//! - Error classification and the in-task retry loop for transient
//!   gateway/extractor failures

mod engine;
mod references;
mod retry;

pub use engine::{Crawler, Limits};
pub use references::update_references;
pub use retry::{classify_extractor, classify_gateway, classify_transport, Disposition};

use crate::extractor::ExtractorError;
use crate::gateway::GatewayError;
use crate::index::IndexError;
use crate::queue::QueueError;
use thiserror::Error;

/// Errors a crawl task can fail with
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The gateway broke protocol for this hash; the hash has been marked
    /// invalid in the index and must not be retried.
    #[error("Gateway protocol error for {hash}: {message}")]
    Protocol { hash: String, message: String },

    /// The file exceeds the metadata size cap. Not indexed, but also not
    /// marked invalid, so a raised cap can reconsider it later.
    #[error("{hash} ({name}) too large, not indexing")]
    TooLarge { hash: String, name: String },

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Extractor error: {0}")]
    Extractor(#[from] ExtractorError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CrawlError {
    /// Whether the failed task should go back on its queue
    ///
    /// Index and broker failures are transient infrastructure conditions;
    /// redelivery will retry the task. Everything else has been classified
    /// permanent and redelivering would fail identically forever.
    pub fn should_requeue(&self) -> bool {
        matches!(self, CrawlError::Index(_) | CrawlError::Queue(_))
    }
}

/// Result type for crawl operations
pub type CrawlResult<T> = Result<T, CrawlError>;
