use crate::crawler::{CrawlError, Crawler};
use crate::queue::CrawlTask;
use futures::StreamExt;
use lapin::options::{BasicAckOptions, BasicNackOptions};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Which crawl operation a consumer drives
#[derive(Debug, Clone, Copy)]
pub(crate) enum TaskKind {
    Hash,
    File,
}

/// A failed task, as forwarded to the supervisor's error sink
#[derive(Debug)]
pub struct TaskFailure {
    /// Hash of the task that failed
    pub hash: String,

    /// What went wrong
    pub error: CrawlError,
}

/// Runs one consumer until its delivery stream ends
///
/// Each delivery is decoded, crawled, and acked on success. Failures are
/// forwarded to the error sink (best effort) and nacked; whether the task
/// is requeued follows its error classification. Undecodable messages are
/// acked and dropped, since redelivering them can never succeed.
pub(crate) async fn consume_loop(
    mut consumer: lapin::Consumer,
    kind: TaskKind,
    crawler: Arc<Crawler>,
    errors: mpsc::UnboundedSender<TaskFailure>,
) {
    while let Some(delivery) = consumer.next().await {
        let delivery = match delivery {
            Ok(delivery) => delivery,
            Err(e) => {
                tracing::error!("Consumer stream error: {}", e);
                break;
            }
        };

        let task = match decode_task(&delivery.data) {
            Ok(task) => task,
            Err(e) => {
                tracing::error!("Dropping undecodable task: {}", e);
                if let Err(e) = delivery.ack(BasicAckOptions::default()).await {
                    tracing::error!("Failed to ack dropped task: {}", e);
                    break;
                }
                continue;
            }
        };

        let result = match kind {
            TaskKind::Hash => crawler.crawl_hash(&task).await,
            TaskKind::File => crawler.crawl_file(&task).await,
        };

        match result {
            Ok(()) => {
                if let Err(e) = delivery.ack(BasicAckOptions::default()).await {
                    tracing::error!("Failed to ack task {}: {}", task.hash, e);
                    break;
                }
            }
            Err(error) => {
                let requeue = error.should_requeue();

                // Informational; a full or closed sink must not stall the worker
                let _ = errors.send(TaskFailure {
                    hash: task.hash.clone(),
                    error,
                });

                let options = BasicNackOptions {
                    requeue,
                    ..Default::default()
                };
                if let Err(e) = delivery.nack(options).await {
                    tracing::error!("Failed to nack task {}: {}", task.hash, e);
                    break;
                }
            }
        }
    }

    tracing::debug!("Consumer loop ended");
}

/// Decodes a delivery body into a task, rejecting tasks without a hash
fn decode_task(data: &[u8]) -> Result<CrawlTask, serde_json::Error> {
    let task: CrawlTask = serde_json::from_slice(data)?;

    if task.hash.is_empty() {
        return Err(serde::de::Error::custom("task has empty hash"));
    }

    Ok(task)
}
