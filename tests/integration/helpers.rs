//! Shared fixtures for the integration tests

use async_trait::async_trait;
use ipfs_trawler::config::{ExtractorConfig, IndexConfig, IpfsConfig, LimitsConfig};
use ipfs_trawler::crawler::{Crawler, Limits};
use ipfs_trawler::queue::{CrawlTask, QueueError, TaskPublisher};
use ipfs_trawler::{extractor, gateway, index};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Captures published tasks in memory instead of a broker
pub struct MemoryPublisher {
    tasks: Mutex<Vec<CrawlTask>>,
}

impl MemoryPublisher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Snapshot of everything published so far
    pub fn tasks(&self) -> Vec<CrawlTask> {
        self.tasks.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskPublisher for MemoryPublisher {
    async fn publish(&self, task: &CrawlTask) -> Result<(), QueueError> {
        self.tasks.lock().unwrap().push(task.clone());
        Ok(())
    }
}

/// Fails every publish, simulating a broken broker channel
pub struct FailingPublisher;

#[async_trait]
impl TaskPublisher for FailingPublisher {
    async fn publish(&self, _task: &CrawlTask) -> Result<(), QueueError> {
        Err(QueueError::Serialize(
            serde_json::from_str::<i32>("broken").unwrap_err(),
        ))
    }
}

/// A crawl engine wired to mock servers and in-memory queues
pub struct Harness {
    pub gateway_server: MockServer,
    pub index_server: MockServer,
    pub extractor_server: MockServer,
    pub hash_queue: Arc<MemoryPublisher>,
    pub file_queue: Arc<MemoryPublisher>,
    pub crawler: Crawler,
}

/// Builds a harness with the default limits
pub async fn harness() -> Harness {
    harness_with_limits(Limits::from(&LimitsConfig::default())).await
}

/// Builds a harness with custom limits
pub async fn harness_with_limits(limits: Limits) -> Harness {
    let gateway_server = MockServer::start().await;
    let index_server = MockServer::start().await;
    let extractor_server = MockServer::start().await;

    let hash_queue = MemoryPublisher::new();
    let file_queue = MemoryPublisher::new();

    let crawler = build_crawler(
        &gateway_server.uri(),
        &index_server.uri(),
        &extractor_server.uri(),
        hash_queue.clone(),
        file_queue.clone(),
        limits,
    );

    Harness {
        gateway_server,
        index_server,
        extractor_server,
        hash_queue,
        file_queue,
        crawler,
    }
}

/// Builds a crawl engine against explicit endpoint URLs
pub fn build_crawler(
    gateway_url: &str,
    index_url: &str,
    extractor_url: &str,
    hash_queue: Arc<MemoryPublisher>,
    file_queue: Arc<MemoryPublisher>,
    limits: Limits,
) -> Crawler {
    let gateway = gateway::Client::new(&IpfsConfig {
        api_url: gateway_url.to_string(),
        timeout_secs: 5,
    })
    .unwrap();

    let index = index::Client::new(&IndexConfig {
        elasticsearch_url: index_url.to_string(),
        name: "ipfs".to_string(),
    })
    .unwrap();

    let extractor = extractor::Client::new(&ExtractorConfig {
        tika_url: extractor_url.to_string(),
        timeout_secs: 5,
    })
    .unwrap();

    Crawler::new(gateway, index, extractor, hash_queue, file_queue, limits)
}

/// Mounts a `file/ls` listing for a hash on the gateway server
pub async fn mount_listing(server: &MockServer, hash: &str, listing: Value) {
    let body = json!({
        "Arguments": { (format!("/ipfs/{}", hash)): hash },
        "Objects": { (hash): listing },
    });

    Mock::given(method("POST"))
        .and(path("/api/v0/file/ls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mounts a 404 for a document lookup: the hash has no document yet
pub async fn mount_doc_missing(server: &MockServer, hash: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/ipfs/_doc/{}", hash)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"found": false})))
        .mount(server)
        .await;
}

/// Mounts an existing document with the given type and references
pub async fn mount_doc(server: &MockServer, hash: &str, doc_type: &str, references: Value) {
    let body = json!({
        "found": true,
        "_id": hash,
        "_source": { "type": doc_type, "references": references },
    });

    Mock::given(method("GET"))
        .and(path(format!("/ipfs/_doc/{}", hash)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mounts the upsert endpoint for a hash, expecting `expected` calls
pub async fn mount_update(server: &MockServer, hash: &str, expected: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/ipfs/_update/{}", hash)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "updated"})))
        .expect(expected)
        .mount(server)
        .await;
}

/// Mounts extractor metadata for a content path
pub async fn mount_metadata(server: &MockServer, content_path: &str, metadata: Value) {
    Mock::given(method("GET"))
        .and(path(content_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(metadata))
        .mount(server)
        .await;
}

/// Returns the JSON bodies of all upsert requests for a hash
pub async fn update_bodies(server: &MockServer, hash: &str) -> Vec<Value> {
    let wanted = format!("/ipfs/_update/{}", hash);

    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == wanted)
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect()
}

/// Builds a file-queue style task
pub fn task(hash: &str, name: &str, size: u64, parent_hash: &str) -> CrawlTask {
    CrawlTask {
        hash: hash.to_string(),
        name: name.to_string(),
        size,
        parent_hash: parent_hash.to_string(),
        parent_name: String::new(),
    }
}
