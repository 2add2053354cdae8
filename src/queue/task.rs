use serde::{Deserialize, Serialize};

/// A unit of crawl work, as carried on the wire between workers
///
/// The same shape travels on both queues. For hash tasks `size` is unknown
/// and zero; for file tasks it is the size reported by the parent listing.
/// `parent_hash` is empty for root discoveries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlTask {
    /// Content hash to crawl
    #[serde(rename = "Hash")]
    pub hash: String,

    /// Link label under which the parent referenced this item; may be empty
    #[serde(rename = "Name", default)]
    pub name: String,

    /// Object size in bytes; only meaningful for file tasks
    #[serde(rename = "Size", default)]
    pub size: u64,

    /// Hash of the directory this item was discovered under; empty for roots
    #[serde(rename = "ParentHash", default)]
    pub parent_hash: String,

    /// Legacy field, ignored by the crawler but preserved on the wire
    #[serde(rename = "ParentName", default)]
    pub parent_name: String,
}

impl CrawlTask {
    /// Creates a root discovery task for a bare hash
    pub fn root(hash: &str) -> Self {
        Self {
            hash: hash.to_string(),
            name: String::new(),
            size: 0,
            parent_hash: String::new(),
            parent_name: String::new(),
        }
    }
}
