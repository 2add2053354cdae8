//! ipfs-trawler: a distributed crawler and indexer for content-addressed filesystems
//!
//! This crate implements a crawler that resolves content hashes through an IPFS
//! API node, extracts metadata for files, and indexes the results into a search
//! backend. Directories fan out recursively: their children are pushed back onto
//! durable broker queues so a large graph is crawled breadth-first across many
//! workers.

pub mod config;
pub mod crawler;
pub mod extractor;
pub mod gateway;
pub mod index;
pub mod queue;
pub mod worker;

use thiserror::Error;

/// Main error type for trawler operations
#[derive(Debug, Error)]
pub enum TrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Queue error: {0}")]
    Queue(#[from] queue::QueueError),

    #[error("Broker error: {0}")]
    Broker(#[from] lapin::Error),

    #[error("Index error: {0}")]
    Index(#[from] index::IndexError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] gateway::GatewayError),

    #[error("Crawl error: {0}")]
    Crawl(#[from] crawler::CrawlError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for trawler operations
pub type Result<T> = std::result::Result<T, TrawlerError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::Crawler;
pub use queue::{CrawlTask, TaskPublisher, FILES_QUEUE, HASHES_QUEUE};
pub use worker::Worker;
