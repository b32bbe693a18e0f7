//! cfgtree - schema-anchored configuration trees
//!
//! A [`ConfigTree`] is built once (in code or from a schema document),
//! frozen, and then updated only through merges that keep its shape and the
//! kind of every leaf:
//!
//! - [`merge_mapping`] folds in parsed YAML/JSON/TOML documents
//! - [`build_parser`] generates a command-line parser from the tree's leaves,
//!   and [`merge_namespace`] folds the parsed overrides back in
//! - [`flatten`] and [`unflatten`] convert to and from a single-level map
//!
//! Trees are plain values mutated through `&mut`; share one across threads
//! behind your own lock.

pub mod coerce;
pub mod error;
pub mod flatten;
pub mod loader;
pub mod logging;
pub mod merge;
pub mod parser;
pub mod report;
pub mod tree;

pub use coerce::{coerce, decode, decode_and_coerce};
pub use error::CfgError;
pub use flatten::{flatten, unflatten, FlatMap, DEFAULT_SEPARATOR};
pub use loader::{load_document, load_tree, merge_from_file, DocumentFormat, LoadedDocument};
pub use merge::{merge_mapping, merge_namespace, Namespace, NamespacePolicy};
pub use parser::{build_parser, OptionKind, OptionSpec, ParserSpec, ScalarKind};
pub use report::{ConfigOrigin, ConfigSource, EffectiveConfig};
pub use tree::{Array, ConfigTree, Dtype, KeyPath, Kind, Value};
