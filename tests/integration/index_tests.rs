//! Index client behavior against a mock backend

use ipfs_trawler::config::IndexConfig;
use ipfs_trawler::index::{Client, IndexError, Reference};
use serde_json::{json, Map};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> Client {
    Client::new(&IndexConfig {
        elasticsearch_url: server.uri(),
        name: "ipfs".to_string(),
    })
    .unwrap()
}

#[tokio::test]
async fn test_get_references_for_missing_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ipfs/_doc/QmNew"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"found": false})))
        .mount(&server)
        .await;

    let stored = client(&server).get_references("QmNew").await.unwrap();

    assert!(!stored.found);
    assert!(stored.references.is_empty());
    assert!(stored.doc_type.is_empty());
}

#[tokio::test]
async fn test_get_references_for_existing_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ipfs/_doc/QmOld"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "found": true,
            "_id": "QmOld",
            "_source": {
                "type": "file",
                "references": [{"name": "a", "parent_hash": "QmDir"}],
            },
        })))
        .mount(&server)
        .await;

    let stored = client(&server).get_references("QmOld").await.unwrap();

    assert!(stored.found);
    assert_eq!(stored.doc_type, "file");
    assert_eq!(
        stored.references,
        vec![Reference {
            name: "a".to_string(),
            parent_hash: "QmDir".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_get_references_backend_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ipfs/_doc/QmErr"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let error = client(&server).get_references("QmErr").await.unwrap_err();

    assert!(matches!(error, IndexError::Status { status: 503, .. }));
}

#[tokio::test]
async fn test_index_item_upserts_with_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ipfs/_update/QmDoc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "created"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut properties = Map::new();
    properties.insert("size".to_string(), json!(42));

    client(&server)
        .index_item("file", "QmDoc", properties)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();

    assert_eq!(body["doc"]["type"], "file");
    assert_eq!(body["doc"]["size"], 42);
    assert_eq!(body["doc_as_upsert"], true);
}

#[tokio::test]
async fn test_ensure_index_noop_when_present() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/ipfs"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    client(&server).ensure_index().await.unwrap();

    // Only the HEAD probe, no create
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_ensure_index_creates_when_missing() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/ipfs"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/ipfs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"acknowledged": true})))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).ensure_index().await.unwrap();
}
