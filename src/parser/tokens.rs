//! Command-line token parsing for generated options.

use std::fmt;

use crate::tree::{Dtype, Value};

/// Tokens accepted as `true` by boolean options.
const TRUE_TOKENS: &[&str] = &["yes", "true", "t", "y", "on", "1"];

/// Tokens accepted as `false` by boolean options.
const FALSE_TOKENS: &[&str] = &["no", "false", "f", "n", "off", "0"];

/// Type a single command-line token is parsed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int,
    Float,
    Str,
}

impl ScalarKind {
    /// Scalar kind of a leaf value, if it has one.
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(_) => Some(ScalarKind::Bool),
            Value::Int(_) => Some(ScalarKind::Int),
            Value::Float(_) => Some(ScalarKind::Float),
            Value::Str(_) => Some(ScalarKind::Str),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
            ScalarKind::Str => "str",
        }
    }

    /// Placeholder shown in usage lines.
    pub fn value_name(&self) -> &'static str {
        match self {
            ScalarKind::Bool => "BOOL",
            ScalarKind::Int => "INT",
            ScalarKind::Float => "FLOAT",
            ScalarKind::Str => "STR",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ScalarKind::Int | ScalarKind::Float)
    }
}

impl From<Dtype> for ScalarKind {
    fn from(dtype: Dtype) -> Self {
        match dtype {
            Dtype::Bool => ScalarKind::Bool,
            Dtype::Int => ScalarKind::Int,
            Dtype::Float => ScalarKind::Float,
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an explicit boolean token, case-insensitively.
///
/// Only the fixed yes/no token sets are accepted; anything else is an error
/// rather than a silent `false`.
pub fn parse_bool_token(token: &str) -> Result<bool, String> {
    let lowered = token.to_ascii_lowercase();
    if TRUE_TOKENS.contains(&lowered.as_str()) {
        Ok(true)
    } else if FALSE_TOKENS.contains(&lowered.as_str()) {
        Ok(false)
    } else {
        Err(format!("Boolean type expected. Received '{}'", token))
    }
}

/// Parse one token as `kind`.
pub fn parse_token(token: &str, kind: ScalarKind) -> Result<Value, String> {
    match kind {
        ScalarKind::Bool => parse_bool_token(token).map(Value::Bool),
        ScalarKind::Int => token
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| format!("invalid integer '{}': {}", token, e)),
        ScalarKind::Float => token
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| format!("invalid float '{}': {}", token, e)),
        ScalarKind::Str => Ok(Value::Str(token.to_string())),
    }
}
