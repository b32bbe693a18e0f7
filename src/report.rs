//! Effective configuration with provenance
//!
//! Wraps a frozen tree together with every source merged into it, in merge
//! order, so a run can record exactly how its configuration came about.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::CfgError;
use crate::flatten::{flatten, FlatMap};
use crate::loader::{load_document, load_tree};
use crate::merge::{merge_mapping, merge_namespace, NamespacePolicy};
use crate::parser::build_parser;
use crate::tree::{ConfigTree, Value};

/// Schema version for the report
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "cfgtree/effective_config@1";

/// Where a contribution came from
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Schema,
    Document,
    Cli,
}

/// One contribution to the effective config
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    /// File path (None for cli and in-memory schemas)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for cli and in-memory schemas)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,

    /// Leaves declared (schema) or written (merges)
    pub leaves_written: usize,
}

/// Frozen configuration plus its sources in merge order
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub schema_version: u32,
    pub schema_id: String,
    pub created_at: DateTime<Utc>,
    pub config: ConfigTree,
    pub sources: Vec<ConfigSource>,
}

impl EffectiveConfig {
    /// Load a schema document and freeze it.
    pub fn from_schema_file(path: &Path) -> Result<Self, CfgError> {
        let (mut tree, doc) = load_tree(path)?;
        tree.freeze();
        let leaves = tree.leaves().len();
        Ok(Self::with_source(
            tree,
            ConfigSource {
                origin: ConfigOrigin::Schema,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(doc.digest),
                leaves_written: leaves,
            },
        ))
    }

    /// Wrap an in-memory schema, freezing it.
    pub fn from_tree(mut tree: ConfigTree) -> Self {
        tree.freeze();
        let leaves = tree.leaves().len();
        Self::with_source(
            tree,
            ConfigSource {
                origin: ConfigOrigin::Schema,
                path: None,
                digest: None,
                leaves_written: leaves,
            },
        )
    }

    fn with_source(config: ConfigTree, source: ConfigSource) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            config,
            sources: vec![source],
        }
    }

    /// Merge a YAML/JSON/TOML document.
    pub fn merge_file(&mut self, path: &Path) -> Result<usize, CfgError> {
        let doc = load_document(path)?;
        let written = merge_mapping(&doc.value, &mut self.config)?;
        info!(path = %path.display(), written, "merged document");
        self.sources.push(ConfigSource {
            origin: ConfigOrigin::Document,
            path: Some(path.to_string_lossy().to_string()),
            digest: Some(doc.digest),
            leaves_written: written,
        });
        Ok(written)
    }

    /// Parse overrides with a parser generated from the current tree and
    /// merge them. `args` starts with the program name.
    pub fn merge_cli<I, T>(&mut self, args: I, policy: NamespacePolicy) -> Result<usize, CfgError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let namespace = build_parser(&self.config)?.parse_from(args)?;
        let written = merge_namespace(&namespace, &mut self.config, policy)?;
        info!(written, "merged command-line overrides");
        self.sources.push(ConfigSource {
            origin: ConfigOrigin::Cli,
            path: None,
            digest: None,
            leaves_written: written,
        });
        Ok(written)
    }

    pub fn flattened(&self, sep: &str) -> Result<FlatMap, CfgError> {
        flatten(&self.config, sep)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write to file
    pub fn write_to_file(&self, path: &Path) -> Result<(), CfgError> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| CfgError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Get a config value by dotted path
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.config.lookup_path(path)
    }
}
