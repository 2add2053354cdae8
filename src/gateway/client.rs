use crate::config::IpfsConfig;
use crate::gateway::{GatewayError, GatewayResult, Listing};
use bytes::Bytes;
use futures::Stream;
use serde::Deserialize;
use std::collections::HashMap;

/// Client for the IPFS node HTTP API
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

/// Wire shape of the node's `file/ls` response
///
/// The node keys objects by resolved hash and maps the requested path to
/// that hash in `Arguments`.
#[derive(Debug, Deserialize)]
struct LsResponse {
    #[serde(rename = "Arguments", default)]
    arguments: HashMap<String, String>,

    #[serde(rename = "Objects", default)]
    objects: HashMap<String, Listing>,
}

impl Client {
    /// Creates a gateway client from configuration
    ///
    /// The configured timeout applies per request. Resolving a hash can
    /// legitimately take minutes when the node has to find providers, so
    /// the default is generous.
    pub fn new(config: &IpfsConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Lists a hash, resolving it to its immediate structure
    ///
    /// # Returns
    ///
    /// * `Ok(Listing)` - type, size, and links of the object
    /// * `Err(GatewayError::Protocol)` - the node's answer was not a listing
    /// * `Err(_)` - transport or node-side failure, classified by the engine
    pub async fn list(&self, hash: &str) -> GatewayResult<Listing> {
        let path = hash_path(hash);
        let url = format!("{}/api/v0/file/ls", self.base_url);

        let response = self
            .http
            .post(&url)
            .query(&[("arg", path.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.text().await?;
        parse_listing(hash, &body)
    }

    /// Fetches raw content bytes under a path of the form `/ipfs/<hash>[/<name>]`
    pub async fn fetch_path(
        &self,
        path: &str,
    ) -> GatewayResult<impl Stream<Item = Result<Bytes, reqwest::Error>>> {
        let url = format!("{}/api/v0/cat", self.base_url);

        let response = self.http.post(&url).query(&[("arg", path)]).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.bytes_stream())
    }
}

/// Builds the content path for a bare hash
pub fn hash_path(hash: &str) -> String {
    format!("/ipfs/{}", hash)
}

/// Parses a `file/ls` response body into the listing for `hash`
///
/// A body that does not decode, or that decodes but does not contain the
/// requested object, is a protocol error.
fn parse_listing(hash: &str, body: &str) -> GatewayResult<Listing> {
    let response: LsResponse = serde_json::from_str(body)
        .map_err(|e| GatewayError::Protocol(format!("malformed listing: {}", e)))?;

    let path = hash_path(hash);
    let key = response
        .arguments
        .get(&path)
        .cloned()
        .unwrap_or_else(|| hash.to_string());

    let mut objects = response.objects;
    if let Some(listing) = objects.remove(&key) {
        return Ok(listing);
    }

    // Some node versions key the object differently; accept a lone object
    if objects.len() == 1 {
        if let Some(listing) = objects.into_values().next() {
            return Ok(listing);
        }
    }

    Err(GatewayError::Protocol(format!(
        "listing for '{}' missing from response",
        hash
    )))
}
