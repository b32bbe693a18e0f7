//! Flat single-level form of a tree, keyed by separator-joined paths.

use indexmap::IndexMap;
use tracing::debug;

use crate::error::CfgError;
use crate::tree::{ConfigTree, KeyPath, Value};

/// Separator used by the persisted flat form.
pub const DEFAULT_SEPARATOR: &str = "::";

/// Joined key to leaf value, in depth-first insertion order.
pub type FlatMap = IndexMap<String, Value>;

/// Flatten every leaf of `tree` into one entry keyed by its joined path.
///
/// `unflatten(flatten(t)) == t` holds for trees without keys containing
/// `sep`, without colliding paths and without empty subtrees. An empty
/// subtree has no leaves, produces no entry and is absent after
/// [`unflatten`].
pub fn flatten(tree: &ConfigTree, sep: &str) -> Result<FlatMap, CfgError> {
    if sep.is_empty() {
        return Err(CfgError::EmptySeparator);
    }

    let mut flat = FlatMap::new();
    for (path, leaf) in tree.leaves() {
        let key = path.join(sep);
        if flat.contains_key(&key) {
            return Err(CfgError::FlattenCollision { key });
        }
        flat.insert(key, leaf.clone());
    }

    debug!(entries = flat.len(), sep, "flattened tree");
    Ok(flat)
}

/// Rebuild an unfrozen tree from a flat map.
pub fn unflatten(flat: &FlatMap, sep: &str) -> Result<ConfigTree, CfgError> {
    if sep.is_empty() {
        return Err(CfgError::EmptySeparator);
    }

    let mut tree = ConfigTree::new();
    for (key, value) in flat {
        if value.is_node() {
            return Err(CfgError::schema_mismatch(key, "flat values must be leaves"));
        }
        let path: KeyPath = key.split(sep).collect();
        insert_leaf(&mut tree, &path, value.clone())?;
    }

    debug!(entries = flat.len(), sep, "unflattened tree");
    Ok(tree)
}

fn insert_leaf(tree: &mut ConfigTree, path: &KeyPath, value: Value) -> Result<(), CfgError> {
    let Some((last, parents)) = path.segments().split_last() else {
        return Err(CfgError::schema_mismatch(path, "empty key"));
    };

    let mut node = tree;
    for (depth, segment) in parents.iter().enumerate() {
        if node.lookup(segment).is_some_and(Value::is_leaf) {
            let prefix: KeyPath = path.segments()[..=depth].iter().cloned().collect();
            return Err(CfgError::schema_mismatch(
                prefix,
                format!("leaf is in the way of {}", path),
            ));
        }
        node = node.node(segment)?;
    }

    if node.lookup(last).is_some_and(Value::is_node) {
        return Err(CfgError::schema_mismatch(path, "leaf would replace a subtree"));
    }
    node.set(last, value)
}

impl ConfigTree {
    /// Flatten with `sep`; see [`flatten`].
    pub fn flatten(&self, sep: &str) -> Result<FlatMap, CfgError> {
        flatten(self, sep)
    }

    /// Rebuild from a flat map; see [`unflatten`].
    pub fn unflatten(flat: &FlatMap, sep: &str) -> Result<ConfigTree, CfgError> {
        unflatten(flat, sep)
    }
}
