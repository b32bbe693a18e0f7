//! Schema-preserving merges
//!
//! Two sources can be merged into a tree:
//! - A nested mapping (parsed YAML/JSON/TOML), walked source-first
//! - A flat namespace keyed by dotted path (parsed CLI), walked schema-first
//!
//! Both only ever write keys the schema already has. Every write is planned
//! before the first one is applied, so a failed merge leaves the tree as it
//! was.

use indexmap::IndexMap;
use serde_json::{Map, Value as Json};
use tracing::{debug, trace};

use crate::coerce::{coerce, decode_and_coerce};
use crate::error::CfgError;
use crate::tree::{json_type, ConfigTree, KeyPath, Value};

/// How a namespace merge treats schema leaves with no namespace entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NamespacePolicy {
    /// Every leaf must have an entry; a missing one is an error.
    #[default]
    Strict,
    /// Missing entries leave the leaf unchanged.
    Partial,
}

/// Flat mapping from dotted path to value, as produced by a generated parser.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Namespace {
    values: IndexMap<String, Value>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `path`.
    pub fn insert(&mut self, path: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(path.into(), value.into());
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.values.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.values.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Namespace {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ns = Namespace::new();
        for (k, v) in iter {
            ns.insert(k, v);
        }
        ns
    }
}

/// Pending leaf writes, applied only once the whole source checked out.
type Plan = Vec<(KeyPath, Value)>;

/// Merge a nested mapping into `target`.
///
/// Keys absent from the schema fail with `UnknownKey`, independent of the
/// frozen flag. Scalar values are decoded and coerced against the current
/// leaf. Returns the number of leaves written.
pub fn merge_mapping(source: &Json, target: &mut ConfigTree) -> Result<usize, CfgError> {
    let map = match source {
        Json::Object(map) => map,
        other => {
            return Err(CfgError::schema_mismatch(
                KeyPath::root(),
                format!("expected a mapping, found {}", json_type(other)),
            ))
        }
    };

    let mut plan = Plan::new();
    plan_mapping(map, target, &KeyPath::root(), &mut plan)?;
    let written = apply(plan, target)?;
    debug!(written, "merged mapping");
    Ok(written)
}

fn plan_mapping(
    source: &Map<String, Json>,
    target: &ConfigTree,
    prefix: &KeyPath,
    plan: &mut Plan,
) -> Result<(), CfgError> {
    for (key, raw) in source {
        let path = prefix.child(key);
        let current = target.lookup(key).ok_or_else(|| CfgError::UnknownKey {
            path: path.to_string(),
        })?;

        match (raw, current) {
            (Json::Object(inner), Value::Node(child)) => {
                plan_mapping(inner, child, &path, plan)?;
            }
            (Json::Object(_), leaf) => {
                return Err(CfgError::schema_mismatch(
                    &path,
                    format!("mapping given for a {} leaf", leaf.kind()),
                ));
            }
            (other, Value::Node(_)) => {
                return Err(CfgError::schema_mismatch(
                    &path,
                    format!("{} given for a subtree", json_type(other)),
                ));
            }
            (other, leaf) => {
                let value = decode_and_coerce(Value::from_json_at(other, &path)?, leaf, &path)?;
                plan.push((path, value));
            }
        }
    }
    Ok(())
}

/// Merge a flat namespace into `target`, driven by the schema's leaves.
///
/// Values are coerced but not decoded; a generated parser has already typed
/// them. Entries naming no schema leaf are ignored. Returns the number of
/// leaves written.
pub fn merge_namespace(
    namespace: &Namespace,
    target: &mut ConfigTree,
    policy: NamespacePolicy,
) -> Result<usize, CfgError> {
    let mut plan = Plan::new();
    for (path, leaf) in target.leaves() {
        let dotted = path.to_string();
        match namespace.get(&dotted) {
            Some(value) => {
                let value = coerce(value.clone(), leaf, &path)?;
                plan.push((path, value));
            }
            None if policy == NamespacePolicy::Strict => {
                return Err(CfgError::MissingNamespaceKey { path: dotted });
            }
            None => trace!(path = %dotted, "no namespace entry, leaf kept"),
        }
    }

    let written = apply(plan, target)?;
    debug!(written, entries = namespace.len(), "merged namespace");
    Ok(written)
}

fn apply(plan: Plan, target: &mut ConfigTree) -> Result<usize, CfgError> {
    let written = plan.len();
    for (path, value) in plan {
        trace!(path = %path, value = %value, "write leaf");
        target.write_path(path.segments(), value)?;
    }
    Ok(written)
}
