use serde::{Deserialize, Serialize};

/// How an indexed document remembers where it was reached from
///
/// References form a set keyed by `parent_hash`: a document carries at most
/// one reference per parent, regardless of name variations. The set only
/// ever grows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Link label under which the parent referenced this item
    pub name: String,

    /// Hash of the referencing parent
    pub parent_hash: String,
}

/// The reference state stored for a hash, as returned by the index
#[derive(Debug, Clone, Default)]
pub struct StoredReferences {
    /// Current reference list; empty when none are stored
    pub references: Vec<Reference>,

    /// Stored document type (`file`, `directory`, or `invalid`)
    pub doc_type: String,

    /// Whether a document exists for the hash at all
    pub found: bool,
}
