use crate::config::Config;
use crate::crawler::{Crawler, Limits};
use crate::queue::{self, TaskQueue, FILES_QUEUE, HASHES_QUEUE};
use crate::worker::consumer::{consume_loop, TaskFailure, TaskKind};
use crate::{extractor, gateway, index};
use lapin::{Channel, Connection};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// AMQP reply code for a clean close
const REPLY_SUCCESS: u16 = 200;

/// The worker supervisor: broker connection, crawl engine, and consumer pools
///
/// Every channel the supervisor opens is tracked and closed on shutdown.
/// Closing the connection ends the consumer streams, which ends the
/// consumer tasks.
pub struct Worker {
    connection: Connection,
    crawler: Arc<Crawler>,
    config: Config,
    open_channels: Vec<Channel>,
    handles: Vec<JoinHandle<()>>,
}

impl Worker {
    /// Connects to the broker and builds the crawl engine
    ///
    /// The publish channel and both queues are declared here so a
    /// misconfigured broker fails fast, before any consumer starts.
    pub async fn new(config: Config) -> crate::Result<Self> {
        let connection = queue::connect(&config.queue.amqp_url).await?;

        let publish_channel = connection.create_channel().await?;
        let hash_queue = TaskQueue::declare(publish_channel.clone(), HASHES_QUEUE).await?;
        let file_queue = TaskQueue::declare(publish_channel.clone(), FILES_QUEUE).await?;

        let gateway = gateway::Client::new(&config.ipfs)?;
        let index = index::Client::new(&config.index)?;
        let extractor = extractor::Client::new(&config.extractor)?;

        let crawler = Crawler::new(
            gateway,
            index,
            extractor,
            Arc::new(hash_queue),
            Arc::new(file_queue),
            Limits::from(&config.limits),
        );

        Ok(Self {
            connection,
            crawler: Arc::new(crawler),
            config,
            open_channels: vec![publish_channel],
            handles: Vec::new(),
        })
    }

    /// Spawns the hash and file consumer pools
    ///
    /// Hash consumers start first, then file consumers, each pool staggered
    /// by its configured wait. Task failures are forwarded to `error_sink`;
    /// the supervisor itself keeps running through them.
    pub async fn start(
        &mut self,
        error_sink: mpsc::UnboundedSender<TaskFailure>,
    ) -> crate::Result<()> {
        let hash_workers = self.config.workers.hash_workers;
        let hash_wait = self.config.workers.hash_wait();
        if let Err(e) = self
            .start_consumers(HASHES_QUEUE, hash_workers, hash_wait, TaskKind::Hash, &error_sink)
            .await
        {
            self.close().await;
            return Err(e);
        }

        let file_workers = self.config.workers.file_workers;
        let file_wait = self.config.workers.file_wait();
        if let Err(e) = self
            .start_consumers(FILES_QUEUE, file_workers, file_wait, TaskKind::File, &error_sink)
            .await
        {
            self.close().await;
            return Err(e);
        }

        tracing::info!(
            "Started {} hash workers and {} file workers",
            hash_workers,
            file_workers
        );

        Ok(())
    }

    /// Spawns one pool of consumers against a queue
    async fn start_consumers(
        &mut self,
        queue_name: &'static str,
        count: usize,
        wait: Duration,
        kind: TaskKind,
        error_sink: &mpsc::UnboundedSender<TaskFailure>,
    ) -> crate::Result<()> {
        for i in 0..count {
            let channel = self.connection.create_channel().await?;
            self.open_channels.push(channel.clone());

            let queue = TaskQueue::declare(channel, queue_name).await?;
            let consumer = queue.consume(&format!("{}-worker-{}", queue_name, i)).await?;

            let handle = tokio::spawn(consume_loop(
                consumer,
                kind,
                Arc::clone(&self.crawler),
                error_sink.clone(),
            ));
            self.handles.push(handle);

            // Stagger startups to avoid a thundering herd at the gateway
            tokio::time::sleep(wait).await;
        }

        Ok(())
    }

    /// Closes every opened channel, then the connection
    ///
    /// In-flight tasks see their next broker operation fail and their
    /// unacked deliveries are requeued by the broker.
    pub async fn close(&mut self) {
        for channel in self.open_channels.drain(..) {
            if let Err(e) = channel.close(REPLY_SUCCESS, "shutting down").await {
                tracing::warn!("Error closing channel: {}", e);
            }
        }

        if let Err(e) = self.connection.close(REPLY_SUCCESS, "shutting down").await {
            tracing::warn!("Error closing connection: {}", e);
        }

        self.handles.clear();
    }
}
