//! Broker client for the task queues
//!
//! This module wraps the AMQP broker behind the two primitives the crawler
//! needs: publishing a task to a named durable queue, and consuming a queue
//! with acknowledgement. Queues survive broker restarts and unacked messages
//! are redelivered, giving the crawler at-least-once delivery.
//!
//! A channel is never shared between a publisher and a consumer: the worker
//! supervisor opens one channel for publishing and one per consumer.

mod client;
mod task;

pub use client::{connect, TaskQueue};
pub use task::CrawlTask;

use async_trait::async_trait;
use thiserror::Error;

/// Name of the durable queue carrying hash (directory resolution) tasks
pub const HASHES_QUEUE: &str = "hashes";

/// Name of the durable queue carrying file (metadata extraction) tasks
pub const FILES_QUEUE: &str = "files";

/// Errors that can occur talking to the broker
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Broker error: {0}")]
    Broker(#[from] lapin::Error),

    #[error("Task serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

/// Destination for crawl tasks
///
/// The crawl engine publishes child tasks through this trait rather than a
/// concrete queue, so tests can capture published tasks in memory.
#[async_trait]
pub trait TaskPublisher: Send + Sync {
    /// Publishes a task, persisted at the broker
    async fn publish(&self, task: &CrawlTask) -> QueueResult<()>;
}
