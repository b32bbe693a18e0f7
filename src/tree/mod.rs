//! Freeze-aware configuration tree
//!
//! A `ConfigTree` is both the schema and the live values:
//! - Before freezing, reading an unknown key declares an empty subtree there
//! - After freezing, unknown keys can be neither read nor written
//! - Freezing always applies to the whole subtree below a node
//!
//! Mutation goes through `&mut ConfigTree`; callers sharing a tree across
//! threads wrap it in their own lock.

mod path;
mod value;

pub use path::{KeyPath, PATH_SEPARATOR};
pub use value::{Array, Dtype, Kind, Value};

use indexmap::IndexMap;
use serde::ser::{Serialize, Serializer};
use serde_json::Map;

use crate::error::CfgError;

/// Ordered, freezable mapping from key to [`Value`].
#[derive(Debug, Clone, Default)]
pub struct ConfigTree {
    entries: IndexMap<String, Value>,
    frozen: bool,
}

/// Trees compare by entries; the frozen flag and key order are ignored.
impl PartialEq for ConfigTree {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl ConfigTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an unfrozen tree from a JSON-model object.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, CfgError> {
        match json {
            serde_json::Value::Object(map) => Self::from_json_map_at(map, &KeyPath::root()),
            other => Err(CfgError::schema_mismatch(
                KeyPath::root(),
                format!("expected a mapping, found {}", json_type(other)),
            )),
        }
    }

    pub(crate) fn from_json_map_at(
        map: &Map<String, serde_json::Value>,
        path: &KeyPath,
    ) -> Result<Self, CfgError> {
        let mut tree = Self::new();
        for (key, value) in map {
            let child = Value::from_json_at(value, &path.child(key))?;
            tree.entries.insert(key.clone(), child);
        }
        Ok(tree)
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Lock the key set of this node and every node below it.
    pub fn freeze(&mut self) {
        self.set_frozen(true);
    }

    pub fn unfreeze(&mut self) {
        self.set_frozen(false);
    }

    /// Set the frozen flag on this node and every descendant.
    pub fn set_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
        for value in self.entries.values_mut() {
            if let Value::Node(child) = value {
                child.set_frozen(frozen);
            }
        }
    }

    /// Value at `key`, declaring an empty subtree there if the node is unfrozen.
    ///
    /// Repeated reads of the same fresh key return the same child. The
    /// returned value is read-only; writes go through [`ConfigTree::set`] or
    /// a subtree reached with [`ConfigTree::node`].
    pub fn get(&mut self, key: &str) -> Result<&Value, CfgError> {
        let idx = self.vivify(key)?;
        Ok(&self.entries[idx])
    }

    /// Subtree at `key`, auto-vivified like [`ConfigTree::get`].
    pub fn node(&mut self, key: &str) -> Result<&mut ConfigTree, CfgError> {
        let idx = self.vivify(key)?;
        match &mut self.entries[idx] {
            Value::Node(child) => Ok(child),
            other => Err(CfgError::schema_mismatch(
                key,
                format!("expected a subtree, found {}", other.kind()),
            )),
        }
    }

    fn vivify(&mut self, key: &str) -> Result<usize, CfgError> {
        match self.entries.get_index_of(key) {
            Some(idx) => Ok(idx),
            None if self.frozen => Err(CfgError::MissingKey {
                key: key.to_string(),
            }),
            None => {
                let mut child = ConfigTree::new();
                child.frozen = self.frozen;
                Ok(self
                    .entries
                    .insert_full(key.to_string(), Value::Node(child))
                    .0)
            }
        }
    }

    /// Assign `value` to `key`.
    ///
    /// Unfrozen nodes accept anything. Frozen nodes only accept writes of
    /// the same kind to existing leaves; no coercion happens here.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), CfgError> {
        let mut value = value.into();
        if let Value::Node(child) = &mut value {
            child.set_frozen(self.frozen);
        }

        if !self.frozen {
            self.entries.insert(key.to_string(), value);
            return Ok(());
        }

        match self.entries.get_mut(key) {
            None => Err(CfgError::MissingKey {
                key: key.to_string(),
            }),
            Some(Value::Node(_)) => Err(CfgError::FrozenSubtree {
                key: key.to_string(),
            }),
            Some(_) if value.is_node() => Err(CfgError::schema_mismatch(
                key,
                "cannot replace a leaf with a subtree on a frozen node",
            )),
            Some(slot) if slot.kind() != value.kind() => Err(CfgError::TypeMismatch {
                path: key.to_string(),
                source_type: value.type_name(),
                target_type: slot.type_name(),
                source_value: value.to_string(),
                target_value: slot.to_string(),
            }),
            Some(slot) => {
                *slot = value;
                Ok(())
            }
        }
    }

    /// Value at `key` without auto-vivification.
    pub fn lookup(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Value at a dotted path such as `SVM.C`.
    pub fn lookup_path(&self, dotted: &str) -> Option<&Value> {
        let segments: Vec<&str> = dotted.split(PATH_SEPARATOR).collect();
        self.lookup_segments(&segments)
    }

    /// Value at a path given as separate keys.
    pub fn lookup_segments<S: AsRef<str>>(&self, segments: &[S]) -> Option<&Value> {
        let (last, parents) = segments.split_last()?;
        let mut node = self;
        for segment in parents {
            node = node.lookup(segment.as_ref())?.as_node()?;
        }
        node.lookup(last.as_ref())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn items(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every leaf with its path, depth-first in insertion order.
    pub fn leaves(&self) -> Vec<(KeyPath, &Value)> {
        let mut out = Vec::new();
        self.collect_leaves(&KeyPath::root(), &mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, prefix: &KeyPath, out: &mut Vec<(KeyPath, &'a Value)>) {
        for (key, value) in &self.entries {
            let path = prefix.child(key);
            match value {
                Value::Node(child) => child.collect_leaves(&path, out),
                leaf => out.push((path, leaf)),
            }
        }
    }

    /// Write a leaf at `segments`, applying freeze rules at the final node.
    pub(crate) fn write_path(&mut self, segments: &[String], value: Value) -> Result<(), CfgError> {
        match segments {
            [] => Err(CfgError::schema_mismatch(KeyPath::root(), "empty key path")),
            [key] => self.set(key, value),
            [head, rest @ ..] => match self.entries.get_mut(head.as_str()) {
                Some(Value::Node(child)) => child.write_path(rest, value),
                Some(other) => Err(CfgError::schema_mismatch(
                    head,
                    format!("expected a subtree, found {}", other.kind()),
                )),
                None => Err(CfgError::MissingKey { key: head.clone() }),
            },
        }
    }
}

impl Serialize for ConfigTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter())
    }
}

pub(crate) fn json_type(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "sequence",
        serde_json::Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn svm_tree() -> ConfigTree {
        let mut cfg = ConfigTree::new();
        cfg.node("SVM").unwrap().set("C", 100.0).unwrap();
        cfg.node("SVM").unwrap().set("IMPL", "lbfgs").unwrap();
        cfg.set("NAME", "frozen_dict").unwrap();
        cfg
    }

    #[test]
    fn test_auto_vivification() {
        let cfg = svm_tree();
        assert!(cfg.contains("SVM"));
        assert!(cfg.contains("NAME"));
        assert!(cfg.lookup("SVM").unwrap().is_node());
        assert_eq!(cfg.lookup_path("SVM.C"), Some(&Value::Float(100.0)));
        assert_eq!(cfg.lookup_path("SVM.IMPL"), Some(&Value::from("lbfgs")));
    }

    #[test]
    fn test_repeated_read_returns_same_child() {
        let mut cfg = ConfigTree::new();
        cfg.node("A").unwrap().set("x", 1).unwrap();
        let child = cfg.node("A").unwrap();
        assert_eq!(child.lookup("x"), Some(&Value::Int(1)));
        assert_eq!(cfg.len(), 1);

        cfg.get("fresh").unwrap();
        cfg.get("fresh").unwrap();
        assert_eq!(cfg.len(), 2);
        assert_eq!(cfg.lookup("fresh"), Some(&Value::Node(ConfigTree::new())));
    }

    #[test]
    fn test_lookups_never_vivify() {
        let cfg = svm_tree();
        assert!(cfg.lookup("MISSING").is_none());
        assert!(cfg.lookup_path("SVM.MISSING").is_none());
        assert!(cfg.lookup_path("NAME.deeper").is_none());
        assert!(!cfg.contains("MISSING"));
        assert_eq!(cfg.keys().collect::<Vec<_>>(), vec!["SVM", "NAME"]);
    }

    #[test]
    fn test_frozen_read_of_missing_key_fails() {
        let mut cfg = svm_tree();
        cfg.freeze();
        assert!(cfg.is_frozen());
        assert!(matches!(cfg.get("NAMES"), Err(CfgError::MissingKey { .. })));
        assert!(matches!(
            cfg.node("SVM").unwrap().get("GAMMA"),
            Err(CfgError::MissingKey { .. })
        ));
    }

    #[test]
    fn test_frozen_write_rules() {
        let mut cfg = svm_tree();
        cfg.freeze();

        let err = cfg.set("NEW", "oooops").unwrap_err();
        assert!(matches!(err, CfgError::MissingKey { ref key } if key == "NEW"));

        let err = cfg.set("SVM", "Not SVM Options at all").unwrap_err();
        assert!(matches!(err, CfgError::FrozenSubtree { ref key } if key == "SVM"));

        let err = cfg.set("NAME", ConfigTree::new()).unwrap_err();
        assert!(matches!(err, CfgError::SchemaMismatch { .. }));

        cfg.set("NAME", "renamed").unwrap();
        assert_eq!(cfg.lookup("NAME"), Some(&Value::from("renamed")));
        assert_eq!(cfg.lookup_path("SVM.C"), Some(&Value::Float(100.0)));
    }

    #[test]
    fn test_frozen_tree_keeps_shape_through_every_accessor() {
        let mut cfg = svm_tree();
        cfg.freeze();
        let before = cfg.clone();

        assert!(cfg.get("SVM").unwrap().is_node());
        assert_eq!(cfg.get("NAME").unwrap(), &Value::from("frozen_dict"));

        assert!(matches!(cfg.set("SVM", 3), Err(CfgError::FrozenSubtree { .. })));
        assert!(matches!(
            cfg.node("NAME"),
            Err(CfgError::SchemaMismatch { .. })
        ));

        let err = cfg.set("NAME", true).unwrap_err();
        assert!(matches!(err, CfgError::TypeMismatch { ref path, .. } if path == "NAME"));
        let err = cfg.node("SVM").unwrap().set("C", "high").unwrap_err();
        assert!(matches!(err, CfgError::TypeMismatch { ref path, .. } if path == "C"));

        assert_eq!(cfg, before);
        assert_eq!(cfg.lookup("NAME").map(Value::kind), Some(Kind::Str));
        assert!(cfg.lookup("SVM").unwrap().is_node());
    }

    #[test]
    fn test_unfrozen_tree_allows_kind_changes() {
        let mut cfg = svm_tree();
        cfg.set("NAME", true).unwrap();
        cfg.set("SVM", 3).unwrap();
        assert_eq!(cfg.lookup("SVM"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_freeze_propagates_to_descendants() {
        let mut cfg = ConfigTree::new();
        cfg.node("a").unwrap().node("b").unwrap().set("c", 1).unwrap();
        cfg.freeze();
        let b = cfg.node("a").unwrap().node("b").unwrap();
        assert!(b.is_frozen());

        cfg.unfreeze();
        let b = cfg.node("a").unwrap().node("b").unwrap();
        assert!(!b.is_frozen());
        b.set("d", 2).unwrap();
    }

    #[test]
    fn test_freeze_toggle_matches_single_freeze() {
        let mut once = svm_tree();
        once.freeze();

        let mut toggled = svm_tree();
        toggled.freeze();
        toggled.set_frozen(false);
        toggled.freeze();

        assert_eq!(once.is_frozen(), toggled.is_frozen());
        assert!(matches!(toggled.get("X"), Err(CfgError::MissingKey { .. })));
        assert!(matches!(
            toggled.set("SVM", 1),
            Err(CfgError::FrozenSubtree { .. })
        ));
        assert_eq!(once, toggled);
    }

    #[test]
    fn test_assigned_subtree_adopts_parent_flag() {
        let mut frozen_child = ConfigTree::new();
        frozen_child.set("k", 1).unwrap();
        frozen_child.freeze();

        let mut cfg = ConfigTree::new();
        cfg.set("child", frozen_child).unwrap();
        assert!(!cfg.node("child").unwrap().is_frozen());
        cfg.node("child").unwrap().set("new", 2).unwrap();
    }

    #[test]
    fn test_leaves_are_depth_first_in_insertion_order() {
        let mut cfg = ConfigTree::new();
        cfg.set("NAME", "x").unwrap();
        cfg.node("SVM").unwrap().set("C", 1.0).unwrap();
        cfg.node("SVM").unwrap().node("KERNEL").unwrap().set("TYPE", "rbf").unwrap();
        cfg.set("SEED", 3).unwrap();

        let paths: Vec<String> = cfg.leaves().iter().map(|(p, _)| p.to_string()).collect();
        assert_eq!(paths, vec!["NAME", "SVM.C", "SVM.KERNEL.TYPE", "SEED"]);
    }

    #[test]
    fn test_from_json_builds_unfrozen_tree() {
        let cfg = ConfigTree::from_json(&json!({"SVM": {"C": 100.0}, "NAME": "x"})).unwrap();
        assert!(!cfg.is_frozen());
        assert_eq!(cfg.lookup_path("SVM.C"), Some(&Value::Float(100.0)));

        let err = ConfigTree::from_json(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, CfgError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_write_path_respects_freeze() {
        let mut cfg = svm_tree();
        cfg.freeze();
        cfg.write_path(&["SVM".to_string(), "C".to_string()], Value::Float(1.5))
            .unwrap();
        assert_eq!(cfg.lookup_path("SVM.C"), Some(&Value::Float(1.5)));

        let err = cfg
            .write_path(&["SVM".to_string(), "GAMMA".to_string()], Value::Float(1.5))
            .unwrap_err();
        assert!(matches!(err, CfgError::MissingKey { .. }));

        let err = cfg
            .write_path(&["NAME".to_string(), "x".to_string()], Value::Int(1))
            .unwrap_err();
        assert!(matches!(err, CfgError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_equality_ignores_frozen_flag() {
        let a = svm_tree();
        let mut b = svm_tree();
        b.freeze();
        assert_eq!(a, b);
    }

    #[test]
    fn test_serializes_as_nested_mapping() {
        let cfg = svm_tree();
        assert_eq!(
            serde_json::to_value(&cfg).unwrap(),
            json!({"SVM": {"C": 100.0, "IMPL": "lbfgs"}, "NAME": "frozen_dict"})
        );
    }
}
