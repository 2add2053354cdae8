//! Gateway client behavior against a mock node

use futures::StreamExt;
use ipfs_trawler::config::IpfsConfig;
use ipfs_trawler::gateway::{Client, GatewayError};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> Client {
    Client::new(&IpfsConfig {
        api_url: server.uri(),
        timeout_secs: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn test_list_resolves_a_directory() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v0/file/ls"))
        .and(query_param("arg", "/ipfs/QmDir"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Arguments": {"/ipfs/QmDir": "QmDir"},
            "Objects": {
                "QmDir": {
                    "Hash": "QmDir",
                    "Size": 4096,
                    "Type": "Directory",
                    "Links": [{"Name": "a", "Hash": "QmA", "Size": 10, "Type": "File"}],
                },
            },
        })))
        .mount(&server)
        .await;

    let listing = client(&server).list("QmDir").await.unwrap();

    assert_eq!(listing.typ, "Directory");
    assert_eq!(listing.size, 4096);
    assert_eq!(listing.links.len(), 1);
    assert_eq!(listing.links[0].hash, "QmA");
}

#[tokio::test]
async fn test_list_surfaces_node_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v0/file/ls"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"Message": "merkledag: not found"})),
        )
        .mount(&server)
        .await;

    let error = client(&server).list("QmGone").await.unwrap_err();

    assert!(matches!(error, GatewayError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_list_rejects_non_listing_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v0/file/ls"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway timeout</html>"))
        .mount(&server)
        .await;

    let error = client(&server).list("QmBad").await.unwrap_err();

    assert!(matches!(error, GatewayError::Protocol(_)));
}

#[tokio::test]
async fn test_fetch_path_streams_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v0/cat"))
        .and(query_param("arg", "/ipfs/QmFile/readme.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello, content".to_vec()))
        .mount(&server)
        .await;

    let mut stream = client(&server)
        .fetch_path("/ipfs/QmFile/readme.txt")
        .await
        .unwrap();

    let mut content = Vec::new();
    while let Some(chunk) = stream.next().await {
        content.extend_from_slice(&chunk.unwrap());
    }

    assert_eq!(content, b"hello, content");
}

#[tokio::test]
async fn test_fetch_path_surfaces_node_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v0/cat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("cat failed"))
        .mount(&server)
        .await;

    let result = client(&server).fetch_path("/ipfs/QmGone").await;

    assert!(matches!(
        result.err().unwrap(),
        GatewayError::Status { status: 500, .. }
    ));
}
