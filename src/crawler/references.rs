use crate::index::Reference;

/// Merges a newly observed `(name, parent_hash)` edge into a reference list
///
/// References are keyed by `parent_hash`: a second arrival from the same
/// parent is not recorded, regardless of name. An empty `parent_hash`
/// (a root discovery) never adds a reference.
///
/// # Returns
///
/// The (possibly extended) list and whether it was extended.
pub fn update_references(
    mut references: Vec<Reference>,
    name: &str,
    parent_hash: &str,
) -> (Vec<Reference>, bool) {
    if parent_hash.is_empty() {
        // No parent hash for item, not adding reference
        return (references, false);
    }

    if references.iter().any(|r| r.parent_hash == parent_hash) {
        // Reference exists, not updating
        return (references, false);
    }

    references.push(Reference {
        name: name.to_string(),
        parent_hash: parent_hash.to_string(),
    });

    (references, true)
}
