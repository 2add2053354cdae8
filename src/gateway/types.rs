use serde::{Deserialize, Serialize};

/// Result of listing a hash: its immediate structure, one level deep
#[derive(Debug, Clone, Deserialize)]
pub struct Listing {
    /// Object type as reported by the node: `File`, `Directory`, or other
    #[serde(rename = "Type")]
    pub typ: String,

    /// Object size in bytes
    #[serde(rename = "Size", default)]
    pub size: u64,

    /// Child links; empty for files
    #[serde(rename = "Links", default)]
    pub links: Vec<Link>,
}

/// A labeled edge from a directory to a child object
///
/// Links are serialized into directory documents as-is, so the field names
/// here are also the index document shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Child content hash
    #[serde(rename = "Hash")]
    pub hash: String,

    /// Label the directory gives the child; may be empty
    #[serde(rename = "Name", default)]
    pub name: String,

    /// Child size in bytes
    #[serde(rename = "Size", default)]
    pub size: u64,

    /// Child type: `File`, `Directory`, or other
    #[serde(rename = "Type")]
    pub typ: String,
}
