use crate::config::IndexConfig;
use crate::index::{IndexError, IndexResult, Reference, StoredReferences};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;

/// Timeout for index requests; the backend answers quickly or not at all
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the Elasticsearch document index
///
/// Cheap to clone and safe to share across workers; the backend handles
/// concurrent upserts with last-writer-wins per field.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    index: String,
}

/// Shape of a `GET _doc` response, reduced to the fields the crawler reads
#[derive(Debug, Deserialize)]
struct GetDocResponse {
    found: bool,
    #[serde(rename = "_source", default)]
    source: DocSource,
}

#[derive(Debug, Default, Deserialize)]
struct DocSource {
    #[serde(default)]
    references: Vec<Reference>,
    #[serde(rename = "type", default)]
    doc_type: String,
}

impl Client {
    /// Creates an index client from configuration
    pub fn new(config: &IndexConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: config.elasticsearch_url.trim_end_matches('/').to_string(),
            index: config.name.clone(),
        })
    }

    /// Creates the index if it does not exist yet
    pub async fn ensure_index(&self) -> IndexResult<()> {
        let index_url = format!("{}/{}", self.base_url, self.index);

        let response = self.http.head(&index_url).send().await?;
        if response.status().is_success() {
            return Ok(());
        }

        if response.status().as_u16() != 404 {
            return Err(IndexError::Status {
                status: response.status().as_u16(),
                body: String::new(),
            });
        }

        tracing::info!("Creating index '{}'", self.index);
        let response = self.http.put(&index_url).send().await?;
        if !response.status().is_success() {
            return Err(IndexError::Status {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(())
    }

    /// Fetches the stored references and type for a hash
    ///
    /// # Returns
    ///
    /// * `StoredReferences` with `found = false` when no document exists
    /// * `Err(IndexError)` on transport or backend failure
    pub async fn get_references(&self, hash: &str) -> IndexResult<StoredReferences> {
        let url = format!(
            "{}/{}/_doc/{}?_source=references,type",
            self.base_url, self.index, hash
        );

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if status.as_u16() == 404 {
            return Ok(StoredReferences::default());
        }

        if !status.is_success() {
            return Err(IndexError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.text().await?;
        let doc: GetDocResponse = serde_json::from_str(&body)?;

        Ok(StoredReferences {
            references: doc.source.references,
            doc_type: doc.source.doc_type,
            found: doc.found,
        })
    }

    /// Upserts a document, merging `properties` into any existing fields
    ///
    /// The document is created when absent. When `properties` contains a
    /// `references` field it replaces the stored list, so callers must pass
    /// the fully merged set.
    pub async fn index_item(
        &self,
        doc_type: &str,
        hash: &str,
        mut properties: Map<String, Value>,
    ) -> IndexResult<()> {
        properties.insert("type".to_string(), Value::String(doc_type.to_string()));

        let body = json!({
            "doc": properties,
            "doc_as_upsert": true,
        });

        let url = format!("{}/{}/_update/{}", self.base_url, self.index, hash);
        let response = self.http.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(IndexError::Status {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(())
    }
}
