//! Document loading
//!
//! Reads YAML, JSON or TOML files into the untyped `serde_json` model that
//! merges consume, keeping a SHA-256 digest of the raw bytes for provenance.

use serde_json::{Map, Value as Json};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::CfgError;
use crate::merge::merge_mapping;
use crate::tree::ConfigTree;

/// Input formats, picked by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
    Toml,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Result<Self, CfgError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("yml") | Some("yaml") => Ok(DocumentFormat::Yaml),
            Some("json") => Ok(DocumentFormat::Json),
            Some("toml") => Ok(DocumentFormat::Toml),
            _ => Err(CfgError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Yaml => "yaml",
            DocumentFormat::Json => "json",
            DocumentFormat::Toml => "toml",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parsed document and where it came from.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub path: PathBuf,
    pub format: DocumentFormat,
    /// SHA-256 of the raw file bytes, hex encoded
    pub digest: String,
    pub value: Json,
}

/// Read and parse a document.
///
/// An empty or null document loads as an empty mapping.
pub fn load_document(path: &Path) -> Result<LoadedDocument, CfgError> {
    let format = DocumentFormat::from_path(path)?;
    let bytes = fs::read(path).map_err(|source| CfgError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hex::encode(hasher.finalize());

    let contents = String::from_utf8(bytes).map_err(|e| CfgError::Parse {
        path: path.to_path_buf(),
        detail: format!("invalid UTF-8: {}", e),
    })?;

    let value = if contents.trim().is_empty() {
        Json::Object(Map::new())
    } else {
        match parse_contents(&contents, format) {
            Ok(Json::Null) => Json::Object(Map::new()),
            Ok(value) => value,
            Err(detail) => {
                return Err(CfgError::Parse {
                    path: path.to_path_buf(),
                    detail,
                })
            }
        }
    };

    debug!(path = %path.display(), %format, %digest, "loaded document");
    Ok(LoadedDocument {
        path: path.to_path_buf(),
        format,
        digest,
        value,
    })
}

fn parse_contents(contents: &str, format: DocumentFormat) -> Result<Json, String> {
    match format {
        DocumentFormat::Yaml => {
            serde_yaml::from_str(contents).map_err(|e| format!("YAML parse error: {}", e))
        }
        DocumentFormat::Json => {
            serde_json::from_str(contents).map_err(|e| format!("JSON parse error: {}", e))
        }
        DocumentFormat::Toml => toml::from_str::<toml::Value>(contents)
            .map(toml_to_json)
            .map_err(|e| format!("TOML parse error: {}", e)),
    }
}

fn toml_to_json(toml: toml::Value) -> Json {
    match toml {
        toml::Value::String(s) => Json::String(s),
        toml::Value::Integer(i) => Json::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        toml::Value::Boolean(b) => Json::Bool(b),
        toml::Value::Datetime(dt) => Json::String(dt.to_string()),
        toml::Value::Array(arr) => Json::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Json::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Build an unfrozen tree from a schema document.
pub fn load_tree(path: &Path) -> Result<(ConfigTree, LoadedDocument), CfgError> {
    let doc = load_document(path)?;
    let tree = ConfigTree::from_json(&doc.value)?;
    Ok((tree, doc))
}

/// Load a document and merge it into `target`; returns the leaves written.
pub fn merge_from_file(path: &Path, target: &mut ConfigTree) -> Result<usize, CfgError> {
    let doc = load_document(path)?;
    merge_mapping(&doc.value, target)
}
