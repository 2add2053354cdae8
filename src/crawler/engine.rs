use crate::config::LimitsConfig;
use crate::crawler::references::update_references;
use crate::crawler::retry::{classify_extractor, classify_gateway, Disposition};
use crate::crawler::{CrawlError, CrawlResult};
use crate::extractor;
use crate::gateway::{self, Listing};
use crate::index::{self, Reference};
use crate::queue::{CrawlTask, TaskPublisher};
use serde_json::{Map, Value};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};

/// Number of reference lock shards; collisions only cost a short wait
const REF_LOCK_SHARDS: usize = 256;

/// Crawl limits, resolved from configuration
#[derive(Debug, Clone)]
pub struct Limits {
    /// Files over this size are rejected instead of extracted
    pub metadata_max_size: u64,

    /// Chunker block size marking likely partial content
    pub partial_size: u64,

    /// Wait between retries of transient failures
    pub retry_wait: Duration,
}

impl From<&LimitsConfig> for Limits {
    fn from(config: &LimitsConfig) -> Self {
        Self {
            metadata_max_size: config.metadata_max_size,
            partial_size: config.partial_size,
            retry_wait: config.retry_wait(),
        }
    }
}

/// Sharded locks serializing reference read-modify-write per hash
///
/// Two workers updating references for the same hash would otherwise both
/// read the same list and each write back only their own addition. The
/// shard is picked by hashing the content hash; unrelated hashes sharing a
/// shard wait briefly on each other.
struct RefLocks {
    shards: Vec<Mutex<()>>,
}

impl RefLocks {
    fn new() -> Self {
        Self {
            shards: (0..REF_LOCK_SHARDS).map(|_| Mutex::new(())).collect(),
        }
    }

    async fn lock(&self, hash: &str) -> MutexGuard<'_, ()> {
        let mut hasher = DefaultHasher::new();
        hash.hash(&mut hasher);
        let shard = (hasher.finish() as usize) % self.shards.len();
        self.shards[shard].lock().await
    }
}

/// The crawl engine: per-task logic for hash and file crawls
///
/// Shared across all workers. The gateway and index clients are stateless;
/// the publishers go through the broker. One `Crawler` serves both queues.
pub struct Crawler {
    gateway: gateway::Client,
    index: index::Client,
    extractor: extractor::Client,
    hash_queue: Arc<dyn TaskPublisher>,
    file_queue: Arc<dyn TaskPublisher>,
    limits: Limits,
    ref_locks: RefLocks,
}

impl Crawler {
    /// Creates a crawl engine
    pub fn new(
        gateway: gateway::Client,
        index: index::Client,
        extractor: extractor::Client,
        hash_queue: Arc<dyn TaskPublisher>,
        file_queue: Arc<dyn TaskPublisher>,
        limits: Limits,
    ) -> Self {
        Self {
            gateway,
            index,
            extractor,
            hash_queue,
            file_queue,
            limits,
            ref_locks: RefLocks::new(),
        }
    }

    /// Crawls a hash whose type is not yet known
    ///
    /// Resolves the hash through the gateway, then either hands it to the
    /// file queue (files) or publishes its links as child tasks and indexes
    /// the directory document (directories). Children are enqueued before
    /// the directory document is written, so a failure in between is
    /// recovered by redelivery.
    pub async fn crawl_hash(&self, task: &CrawlTask) -> CrawlResult<()> {
        let (references, already_indexed) = self
            .index_references(&task.hash, &task.name, &task.parent_hash)
            .await?;

        if already_indexed {
            return Ok(());
        }

        tracing::info!("Crawling hash '{}' ({})", task.hash, task.name);

        let listing = self.list_with_retry(&task.hash).await?;

        match listing.typ.as_str() {
            "File" => {
                // Size is only known now; the file worker does the rest
                self.file_queue
                    .publish(&CrawlTask {
                        hash: task.hash.clone(),
                        name: task.name.clone(),
                        size: listing.size,
                        parent_hash: task.parent_hash.clone(),
                        parent_name: String::new(),
                    })
                    .await?;
            }
            "Directory" => {
                self.queue_directory_links(&task.hash, &listing).await?;

                // Skip unreferenced partial content
                if listing.size == self.limits.partial_size && task.parent_hash.is_empty() {
                    tracing::info!(
                        "Skipping unreferenced partial content for directory {}",
                        task.hash
                    );
                    return Ok(());
                }

                let mut properties = Map::new();
                properties.insert("links".to_string(), serde_json::to_value(&listing.links)?);
                properties.insert("size".to_string(), Value::from(listing.size));
                properties.insert("references".to_string(), serde_json::to_value(&references)?);

                self.index.index_item("directory", &task.hash, properties).await?;
            }
            other => {
                tracing::info!("Type '{}' skipped for '{}'", other, task.hash);
            }
        }

        tracing::debug!("Finished hash {}", task.hash);

        Ok(())
    }

    /// Crawls an object known to be a file
    ///
    /// Applies the partial-block guard and size gate, fetches metadata for
    /// files worth extracting, and writes the document in a single upsert.
    pub async fn crawl_file(&self, task: &CrawlTask) -> CrawlResult<()> {
        // Skip unreferenced partial content
        if task.size == self.limits.partial_size && task.parent_hash.is_empty() {
            tracing::info!(
                "Skipping unreferenced partial content for file {}",
                task.hash
            );
            return Ok(());
        }

        let (references, already_indexed) = self
            .index_references(&task.hash, &task.name, &task.parent_hash)
            .await?;

        if already_indexed {
            return Ok(());
        }

        tracing::info!("Crawling file {} ({})", task.hash, task.name);

        let mut metadata = Map::new();

        if task.size > 0 {
            if task.size > self.limits.metadata_max_size {
                return Err(CrawlError::TooLarge {
                    hash: task.hash.clone(),
                    name: task.name.clone(),
                });
            }

            let path = metadata_path(task);
            metadata = self.extract_with_retry(&path).await?;
        }

        metadata.insert("size".to_string(), Value::from(task.size));
        metadata.insert("references".to_string(), serde_json::to_value(&references)?);

        self.index.index_item("file", &task.hash, metadata).await?;

        tracing::debug!("Finished file {}", task.hash);

        Ok(())
    }

    /// Records the `(name, parent_hash)` edge on an existing document
    ///
    /// This is the idempotence gate: once a document exists for the hash,
    /// redeliveries end here without touching the gateway or extractor.
    ///
    /// # Returns
    ///
    /// The merged reference list for the hash and whether a document
    /// already existed.
    async fn index_references(
        &self,
        hash: &str,
        name: &str,
        parent_hash: &str,
    ) -> CrawlResult<(Vec<Reference>, bool)> {
        // Serialize read-modify-write of this hash's references
        let _guard = self.ref_locks.lock(hash).await;

        let stored = self.index.get_references(hash).await?;
        let already_indexed = stored.found;

        let (references, updated) = update_references(stored.references, name, parent_hash);

        if already_indexed {
            if updated {
                tracing::info!(
                    "Found {}, reference added: '{}' from {}",
                    hash,
                    name,
                    parent_hash
                );

                let mut properties = Map::new();
                properties.insert("references".to_string(), serde_json::to_value(&references)?);

                self.index
                    .index_item(&stored.doc_type, hash, properties)
                    .await?;
            } else {
                tracing::debug!("Found {}, references not updated", hash);
            }
        } else if updated {
            tracing::debug!("Adding {}, reference '{}' from {}", hash, name, parent_hash);
        }

        Ok((references, already_indexed))
    }

    /// Publishes a directory's links to the appropriate queues
    ///
    /// File links go to the file queue, directory links back to the hash
    /// queue. Other link types are logged and skipped. A publish failure
    /// aborts the task so the broker redelivers it.
    async fn queue_directory_links(&self, hash: &str, listing: &Listing) -> CrawlResult<()> {
        for link in &listing.links {
            let child = CrawlTask {
                hash: link.hash.clone(),
                name: link.name.clone(),
                size: link.size,
                parent_hash: hash.to_string(),
                parent_name: String::new(),
            };

            match link.typ.as_str() {
                "File" => self.file_queue.publish(&child).await?,
                "Directory" => self.hash_queue.publish(&child).await?,
                other => {
                    tracing::warn!("Link type '{}' skipped for '{}'", other, hash);
                }
            }
        }

        Ok(())
    }

    /// Lists a hash, retrying transient failures in place
    async fn list_with_retry(&self, hash: &str) -> CrawlResult<Listing> {
        loop {
            let error = match self.gateway.list(hash).await {
                Ok(listing) => return Ok(listing),
                Err(e) => e,
            };

            match classify_gateway(&error) {
                Disposition::Retry => {
                    tracing::warn!(
                        "Gateway error for {}, retrying in {:?}: {}",
                        hash,
                        self.limits.retry_wait,
                        error
                    );
                    tokio::time::sleep(self.limits.retry_wait).await;
                }
                Disposition::Permanent => return Err(error.into()),
                Disposition::Poison => {
                    let message = error.to_string();
                    self.poison(hash, &message).await?;
                    return Err(CrawlError::Protocol {
                        hash: hash.to_string(),
                        message,
                    });
                }
            }
        }
    }

    /// Fetches metadata, retrying transient failures in place
    async fn extract_with_retry(&self, path: &str) -> CrawlResult<Map<String, Value>> {
        loop {
            let error = match self.extractor.extract(path).await {
                Ok(metadata) => return Ok(metadata),
                Err(e) => e,
            };

            match classify_extractor(&error) {
                Disposition::Retry => {
                    tracing::warn!(
                        "Extractor error for {}, retrying in {:?}: {}",
                        path,
                        self.limits.retry_wait,
                        error
                    );
                    tokio::time::sleep(self.limits.retry_wait).await;
                }
                Disposition::Permanent | Disposition::Poison => return Err(error.into()),
            }
        }
    }

    /// Marks a hash as permanently unprocessable
    ///
    /// Redeliveries of the same hash will find the document and take the
    /// dedup path instead of hitting the gateway again.
    async fn poison(&self, hash: &str, message: &str) -> CrawlResult<()> {
        tracing::error!("Marking {} invalid: {}", hash, message);

        let mut properties = Map::new();
        properties.insert("error".to_string(), Value::String(message.to_string()));

        self.index.index_item("invalid", hash, properties).await?;

        Ok(())
    }
}

/// Builds the extractor path for a file task
///
/// When the parent directory and link name are known the path goes through
/// the parent, keeping the filename visible to the extractor; otherwise the
/// bare hash is used.
fn metadata_path(task: &CrawlTask) -> String {
    if !task.name.is_empty() && !task.parent_hash.is_empty() {
        format!("/ipfs/{}/{}", task.parent_hash, task.name)
    } else {
        format!("/ipfs/{}", task.hash)
    }
}
