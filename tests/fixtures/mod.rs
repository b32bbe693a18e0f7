//! Test fixtures for merge, override and flatten tests
//!
//! The `svm/` directory holds a small schema plus overlay documents in each
//! supported format.

#![allow(dead_code)]

use cfgtree::{Array, ConfigTree, EffectiveConfig, Value};
use std::path::{Path, PathBuf};

/// Path to a file under `tests/fixtures/svm`
pub fn svm_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/svm")
        .join(name)
}

/// Effective config loaded from `svm/schema.yaml`, frozen
pub fn svm_report() -> EffectiveConfig {
    EffectiveConfig::from_schema_file(&svm_path("schema.yaml")).expect("Failed to load schema")
}

/// Image-pipeline schema built in code, frozen
pub fn image_tree() -> ConfigTree {
    let mut cfg = ConfigTree::new();
    cfg.set("IMG_SIZE", Array::from(vec![224_i64, 224, 3])).unwrap();
    cfg.set("MEAN", Array::from(vec![0.0, 0.0, 0.0])).unwrap();
    cfg.set("AUGMENT", true).unwrap();
    cfg.set("CROP", Value::Tuple(vec![Value::Int(32), Value::Int(32)]))
        .unwrap();
    cfg.node("SVM").unwrap().set("C", 100.0).unwrap();
    cfg.node("SVM").unwrap().set("IMPL", "lbfgs").unwrap();
    cfg.freeze();
    cfg
}

/// argv with a program name prepended
pub fn argv(tokens: &[&str]) -> Vec<String> {
    std::iter::once("cfgtree")
        .chain(tokens.iter().copied())
        .map(String::from)
        .collect()
}
