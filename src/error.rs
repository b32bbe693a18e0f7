//! Error type shared by every config tree operation.

use std::io;
use std::path::PathBuf;

/// Errors raised by tree access, merges, parser generation and flattening.
///
/// Every error is terminal for the operation that raised it; nothing is
/// retried internally.
#[derive(Debug, thiserror::Error)]
pub enum CfgError {
    /// Read or write of a non-existent key on a frozen node.
    #[error("Non-existent key: '{key}'")]
    MissingKey { key: String },

    /// Direct overwrite of a key holding a subtree on a frozen node.
    #[error("Unable to reset subtree at key '{key}'")]
    FrozenSubtree { key: String },

    /// Merge source names a key absent from the schema.
    #[error("Non-existent config key: {path}")]
    UnknownKey { path: String },

    /// Mapping given where the schema has a leaf, or the reverse.
    #[error("Schema mismatch at {path}: {detail}")]
    SchemaMismatch { path: String, detail: String },

    /// Coercion cannot reconcile the incoming value with the leaf's kind.
    #[error(
        "Type mismatch ({source_type} vs. {target_type}) with values ({source_value} vs. {target_value}) for key {path}"
    )]
    TypeMismatch {
        path: String,
        source_type: String,
        target_type: String,
        source_value: String,
        target_value: String,
    },

    /// Namespace merge found no entry for a schema leaf.
    #[error("Namespace has no entry for config key {path}")]
    MissingNamespaceKey { path: String },

    /// Two distinct nested paths join to the same key.
    #[error("Paths collide after joining: {key}")]
    FlattenCollision { key: String },

    /// A leaf cannot be expressed as a command-line option.
    #[error("Cannot generate an option for {path}: {reason}")]
    UnparseableLeaf { path: String, reason: String },

    #[error("Path separator must not be empty")]
    EmptySeparator,

    /// Command-line parsing failed; clap's message names the option and token.
    #[error(transparent)]
    Cli(#[from] clap::Error),

    #[error("Failed to read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("Failed to parse {path}: {detail}")]
    Parse { path: PathBuf, detail: String },

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// Writing a tree or report as JSON failed.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing a tree as YAML failed.
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CfgError {
    pub(crate) fn schema_mismatch(path: impl ToString, detail: impl Into<String>) -> Self {
        CfgError::SchemaMismatch {
            path: path.to_string(),
            detail: detail.into(),
        }
    }
}
