//! Values stored under a tree key.

use std::fmt;

use cfgtree_literal::Literal;
use serde::ser::{Serialize, Serializer};

use super::{ConfigTree, KeyPath};
use crate::error::CfgError;

/// Element type of a fixed-length [`Array`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dtype {
    Bool,
    Int,
    Float,
}

impl Dtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dtype::Bool => "bool",
            Dtype::Int => "int",
            Dtype::Float => "float",
        }
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fixed-length homogeneous array.
#[derive(Debug, Clone, PartialEq)]
pub enum Array {
    Bool(Vec<bool>),
    Int(Vec<i64>),
    Float(Vec<f64>),
}

impl Array {
    pub fn dtype(&self) -> Dtype {
        match self {
            Array::Bool(_) => Dtype::Bool,
            Array::Int(_) => Dtype::Int,
            Array::Float(_) => Dtype::Float,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Array::Bool(v) => v.len(),
            Array::Int(v) => v.len(),
            Array::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements as scalar values.
    pub fn to_values(&self) -> Vec<Value> {
        match self {
            Array::Bool(v) => v.iter().copied().map(Value::Bool).collect(),
            Array::Int(v) => v.iter().copied().map(Value::Int).collect(),
            Array::Float(v) => v.iter().copied().map(Value::Float).collect(),
        }
    }

    /// Pack scalar values into an array of `dtype`.
    ///
    /// Float arrays accept integers; otherwise elements must already have the
    /// dtype's kind. Returns `None` if any element does not convert.
    pub fn from_values(dtype: Dtype, values: &[Value]) -> Option<Self> {
        match dtype {
            Dtype::Bool => values
                .iter()
                .map(|v| match v {
                    Value::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()
                .map(Array::Bool),
            Dtype::Int => values
                .iter()
                .map(|v| match v {
                    Value::Int(i) => Some(*i),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()
                .map(Array::Int),
            Dtype::Float => values
                .iter()
                .map(|v| match v {
                    Value::Float(x) => Some(*x),
                    Value::Int(i) => Some(*i as f64),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()
                .map(Array::Float),
        }
    }
}

impl From<Vec<bool>> for Array {
    fn from(v: Vec<bool>) -> Self {
        Array::Bool(v)
    }
}

impl From<Vec<i64>> for Array {
    fn from(v: Vec<i64>) -> Self {
        Array::Int(v)
    }
}

impl From<Vec<f64>> for Array {
    fn from(v: Vec<f64>) -> Self {
        Array::Float(v)
    }
}

/// Discriminant of a [`Value`], fixed for a leaf once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Array,
    Tuple,
    List,
    Node,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Str => "str",
            Kind::Array => "array",
            Kind::Tuple => "tuple",
            Kind::List => "list",
            Kind::Node => "node",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A subtree or a leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Fixed-length homogeneous array.
    Array(Array),
    /// Fixed-arity sequence.
    Tuple(Vec<Value>),
    /// Variable-length sequence.
    List(Vec<Value>),
    Node(ConfigTree),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::Str(_) => Kind::Str,
            Value::Array(_) => Kind::Array,
            Value::Tuple(_) => Kind::Tuple,
            Value::List(_) => Kind::List,
            Value::Node(_) => Kind::Node,
        }
    }

    /// Concrete type name including array dtype/length and tuple arity.
    pub fn type_name(&self) -> String {
        match self {
            Value::Array(a) => format!("array<{}; {}>", a.dtype(), a.len()),
            Value::Tuple(items) => format!("tuple<{}>", items.len()),
            other => other.kind().as_str().to_string(),
        }
    }

    pub fn is_node(&self) -> bool {
        matches!(self, Value::Node(_))
    }

    pub fn is_leaf(&self) -> bool {
        !self.is_node()
    }

    /// Arrays, tuples and lists.
    pub fn is_sequence(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Tuple(_) | Value::List(_))
    }

    /// Null, booleans, numbers and strings.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_)
        )
    }

    pub fn as_node(&self) -> Option<&ConfigTree> {
        match self {
            Value::Node(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn as_node_mut(&mut self) -> Option<&mut ConfigTree> {
        match self {
            Value::Node(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Elements of a sequence, or `Err(self)` for anything else.
    pub fn into_items(self) -> Result<Vec<Value>, Value> {
        match self {
            Value::Array(a) => Ok(a.to_values()),
            Value::Tuple(items) | Value::List(items) => Ok(items),
            other => Err(other),
        }
    }

    /// Convert an untyped JSON-model value, promoting objects to subtrees.
    ///
    /// Strings are kept verbatim; literal decoding is the merge engine's job.
    pub fn from_json(json: &serde_json::Value) -> Result<Value, CfgError> {
        Self::from_json_at(json, &KeyPath::root())
    }

    pub(crate) fn from_json_at(json: &serde_json::Value, path: &KeyPath) -> Result<Value, CfgError> {
        use serde_json::Value as Json;

        Ok(match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or_default()),
            },
            Json::String(s) => Value::Str(s.clone()),
            Json::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for (idx, item) in items.iter().enumerate() {
                    if item.is_object() {
                        return Err(CfgError::schema_mismatch(
                            path,
                            format!("mapping at index {} inside a sequence", idx),
                        ));
                    }
                    values.push(Self::from_json_at(item, path)?);
                }
                Value::List(values)
            }
            Json::Object(map) => Value::Node(ConfigTree::from_json_map_at(map, path)?),
        })
    }
}

impl From<Literal> for Value {
    fn from(lit: Literal) -> Self {
        match lit {
            Literal::None => Value::Null,
            Literal::Bool(b) => Value::Bool(b),
            Literal::Int(i) => Value::Int(i),
            Literal::Float(x) => Value::Float(x),
            Literal::Str(s) => Value::Str(s),
            Literal::List(items) => Value::List(items.into_iter().map(Value::from).collect()),
            Literal::Tuple(items) => Value::Tuple(items.into_iter().map(Value::from).collect()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Array> for Value {
    fn from(a: Array) -> Self {
        Value::Array(a)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<ConfigTree> for Value {
    fn from(tree: ConfigTree) -> Self {
        Value::Node(tree)
    }
}

fn fmt_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    // keep a visible fractional part so 100.0 never reads as an integer
    if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 {
        write!(f, "{:.1}", x)
    } else {
        write!(f, "{}", x)
    }
}

fn fmt_items(f: &mut fmt::Formatter<'_>, items: &[Value], open: &str, close: &str) -> fmt::Result {
    write!(f, "{}", open)?;
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    if open == "(" && items.len() == 1 {
        write!(f, ",")?;
    }
    write!(f, "{}", close)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => fmt_float(f, *x),
            Value::Str(s) => write!(f, "{}", s),
            Value::Array(a) => fmt_items(f, &a.to_values(), "[", "]"),
            Value::Tuple(items) => fmt_items(f, items, "(", ")"),
            Value::List(items) => fmt_items(f, items, "[", "]"),
            Value::Node(tree) => {
                write!(f, "{{")?;
                for (idx, key) in tree.keys().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", key)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Array(Array::Bool(v)) => serializer.collect_seq(v),
            Value::Array(Array::Int(v)) => serializer.collect_seq(v),
            Value::Array(Array::Float(v)) => serializer.collect_seq(v),
            Value::Tuple(items) | Value::List(items) => serializer.collect_seq(items),
            Value::Node(tree) => tree.serialize(serializer),
        }
    }
}
