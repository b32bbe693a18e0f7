//! Restricted literal grammar for textual configuration values.
//!
//! Values arriving as text (YAML strings, raw command-line tokens) are read
//! through this grammar so they can carry native types without a separate
//! type hint. The grammar is deliberately small:
//! - `None` / `null`
//! - `True` / `true` / `False` / `false`
//! - decimal integers and floats (`_` digit separators allowed)
//! - single- or double-quoted strings
//! - flat lists `[a, b]` and tuples `(a, b)`, `(a,)`, `()` of the above
//!
//! Anything else is rejected; callers keep the original text.

mod parser;

pub use parser::parse_literal;

use serde::Serialize;

/// A value recognised by the literal grammar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Literal>),
    Tuple(Vec<Literal>),
}

impl Literal {
    /// Short name of the literal's type, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::None => "null",
            Literal::Bool(_) => "bool",
            Literal::Int(_) => "int",
            Literal::Float(_) => "float",
            Literal::Str(_) => "str",
            Literal::List(_) => "list",
            Literal::Tuple(_) => "tuple",
        }
    }

    /// Whether the literal is a list or tuple.
    pub fn is_sequence(&self) -> bool {
        matches!(self, Literal::List(_) | Literal::Tuple(_))
    }
}

/// Reasons a text is not a literal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LiteralError {
    #[error("empty input")]
    Empty,

    #[error("not a literal: {0}")]
    Unrecognized(String),

    #[error("nested sequences are not supported: {0}")]
    Nested(String),

    #[error("unterminated string: {0}")]
    UnterminatedString(String),

    #[error("empty element in sequence: {0}")]
    EmptyElement(String),

    #[error("integer out of range: {0}")]
    IntOverflow(String),
}
