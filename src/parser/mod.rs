//! Command-line parser generation
//!
//! Every leaf of a tree becomes one `--dotted.path` option whose arity and
//! token type follow the leaf's current value:
//! - scalars take one token
//! - arrays and tuples take exactly as many tokens as they hold
//! - lists take zero or more tokens typed after their first element
//!
//! Defaults are the current leaf values, so the parsed namespace can be
//! merged back with `merge_namespace` and untouched options change nothing.

mod tokens;

pub use tokens::{parse_bool_token, parse_token, ScalarKind};

use std::collections::HashSet;
use std::ffi::OsString;
use std::fmt;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::debug;

use crate::error::CfgError;
use crate::merge::Namespace;
use crate::tree::{Array, ConfigTree, Dtype, KeyPath, Value};

/// Shape of the tokens an option accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Scalar(ScalarKind),
    Array { dtype: Dtype, len: usize },
    List { elem: ScalarKind },
    Tuple { elem: ScalarKind, len: usize },
}

impl OptionKind {
    /// Type each token is parsed as.
    pub fn element(&self) -> ScalarKind {
        match self {
            OptionKind::Scalar(kind) => *kind,
            OptionKind::Array { dtype, .. } => ScalarKind::from(*dtype),
            OptionKind::List { elem } | OptionKind::Tuple { elem, .. } => *elem,
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionKind::Scalar(kind) => write!(f, "{}", kind),
            OptionKind::Array { dtype, len } => write!(f, "array<{}; {}>", dtype, len),
            OptionKind::List { elem } => write!(f, "list<{}>", elem),
            OptionKind::Tuple { elem, len } => write!(f, "tuple<{}; {}>", elem, len),
        }
    }
}

/// One generated option.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSpec {
    /// Path of the leaf this option overrides.
    pub path: KeyPath,
    /// Dotted option name, without the leading `--`.
    pub name: String,
    pub kind: OptionKind,
    /// Current leaf value, used when the option is not given.
    pub default: Value,
}

impl OptionSpec {
    /// The option as typed on the command line.
    pub fn flag(&self) -> String {
        format!("--{}", self.name)
    }

    fn to_arg(&self) -> Arg {
        let elem = self.kind.element();
        let arg = Arg::new(self.name.clone())
            .long(self.name.clone())
            .action(ArgAction::Set)
            .value_name(elem.value_name())
            .value_parser(move |token: &str| parse_token(token, elem))
            .allow_negative_numbers(elem.is_numeric())
            .help(format!("{} (default: {})", self.kind, self.default));

        match self.kind {
            OptionKind::Scalar(_) => arg,
            OptionKind::Array { len, .. } | OptionKind::Tuple { len, .. } => arg.num_args(len),
            OptionKind::List { .. } => arg.num_args(0..),
        }
    }

    fn pack(&self, tokens: Vec<Value>) -> Result<Value, CfgError> {
        match self.kind {
            OptionKind::Scalar(_) => tokens
                .into_iter()
                .next()
                .ok_or_else(|| CfgError::schema_mismatch(&self.path, "option given without a value")),
            OptionKind::Array { dtype, .. } => Array::from_values(dtype, &tokens)
                .map(Value::Array)
                .ok_or_else(|| {
                    CfgError::schema_mismatch(&self.path, format!("tokens do not form a {} array", dtype))
                }),
            OptionKind::List { .. } => Ok(Value::List(tokens)),
            OptionKind::Tuple { .. } => Ok(Value::Tuple(tokens)),
        }
    }
}

/// Generated parser: one option per tree leaf.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParserSpec {
    options: Vec<OptionSpec>,
}

impl ParserSpec {
    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    /// Option by dotted name.
    pub fn option(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.name == name)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Build the clap command carrying every generated option.
    pub fn command(&self, name: impl Into<String>) -> Command {
        self.options.iter().fold(
            Command::new(name.into())
                .about("Override configuration values")
                .args_override_self(true),
            |cmd, spec| cmd.arg(spec.to_arg()),
        )
    }

    /// Parse argv (program name first) into a namespace holding every option.
    pub fn parse_from<I, T>(&self, args: I) -> Result<Namespace, CfgError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.command("cfgtree").try_get_matches_from(args)?;
        self.namespace(&matches)
    }

    /// Collect matches from a command built by [`ParserSpec::command`].
    ///
    /// Options not given on the command line take their default.
    pub fn namespace(&self, matches: &ArgMatches) -> Result<Namespace, CfgError> {
        let mut ns = Namespace::new();
        for spec in &self.options {
            let value = if matches.value_source(&spec.name) == Some(ValueSource::CommandLine) {
                let tokens: Vec<Value> = matches
                    .get_many::<Value>(&spec.name)
                    .map(|values| values.cloned().collect())
                    .unwrap_or_default();
                spec.pack(tokens)?
            } else {
                spec.default.clone()
            };
            ns.insert(spec.name.clone(), value);
        }
        Ok(ns)
    }
}

/// Generate a parser mirroring the leaves of `tree`.
pub fn build_parser(tree: &ConfigTree) -> Result<ParserSpec, CfgError> {
    let mut options = Vec::new();
    let mut seen = HashSet::new();

    for (path, leaf) in tree.leaves() {
        let name = option_name(&path)?;
        if !seen.insert(name.clone()) {
            return Err(CfgError::FlattenCollision { key: name });
        }
        let kind = option_kind(&path, leaf)?;
        options.push(OptionSpec {
            path,
            name,
            kind,
            default: leaf.clone(),
        });
    }

    debug!(options = options.len(), "generated parser");
    Ok(ParserSpec { options })
}

fn unparseable(path: &KeyPath, reason: impl Into<String>) -> CfgError {
    CfgError::UnparseableLeaf {
        path: path.to_string(),
        reason: reason.into(),
    }
}

fn option_name(path: &KeyPath) -> Result<String, CfgError> {
    for segment in path.segments() {
        if segment.is_empty() {
            return Err(unparseable(path, "empty key"));
        }
        if segment.chars().any(|c| c.is_whitespace() || c == '=') {
            return Err(unparseable(path, "key contains whitespace or '='"));
        }
    }

    let name = path.to_string();
    if name.starts_with('-') {
        return Err(unparseable(path, "name starts with '-'"));
    }
    if name == "help" {
        return Err(unparseable(path, "'help' is reserved"));
    }
    Ok(name)
}

fn option_kind(path: &KeyPath, leaf: &Value) -> Result<OptionKind, CfgError> {
    let element_of = |items: &[Value]| -> Result<ScalarKind, CfgError> {
        let first = items
            .first()
            .ok_or_else(|| unparseable(path, "empty sequence, element type cannot be inferred"))?;
        ScalarKind::of(first)
            .ok_or_else(|| unparseable(path, format!("{} elements are not supported", first.kind())))
    };

    match leaf {
        Value::Array(a) if a.is_empty() => Err(unparseable(path, "zero-length array")),
        Value::Array(a) => Ok(OptionKind::Array {
            dtype: a.dtype(),
            len: a.len(),
        }),
        Value::List(items) => Ok(OptionKind::List {
            elem: element_of(items)?,
        }),
        Value::Tuple(items) => Ok(OptionKind::Tuple {
            elem: element_of(items)?,
            len: items.len(),
        }),
        Value::Null => Err(unparseable(path, "null leaves have no type")),
        Value::Node(_) => Err(unparseable(path, "subtrees are not options")),
        scalar => ScalarKind::of(scalar)
            .map(OptionKind::Scalar)
            .ok_or_else(|| unparseable(path, format!("unsupported {} leaf", scalar.kind()))),
    }
}

impl ConfigTree {
    /// Generate a parser for this tree; see [`build_parser`].
    pub fn parser(&self) -> Result<ParserSpec, CfgError> {
        build_parser(self)
    }
}
