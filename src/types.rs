use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::fmt;

/// A leaf value: never decomposed further
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Null => Value::Null,
            Scalar::Bool(b) => Value::Bool(b),
            Scalar::Number(n) => Value::Number(n),
            Scalar::String(s) => Value::String(s),
        }
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(n.into())
    }
}

impl From<u64> for Scalar {
    fn from(n: u64) -> Self {
        Scalar::Number(n.into())
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::String(s) => f.write_str(s),
        }
    }
}

/// One table cell. `None` marks a column the record never had;
/// `Some(Scalar::Null)` is an explicit null that was present in the input.
pub type Cell = Option<Scalar>;

/// The three shapes a node can take during traversal
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Object(Map<String, Value>),
    Array(Vec<Value>),
    Scalar(Scalar),
}

impl Shape {
    /// Classify a JSON value, taking ownership of its children
    pub fn of(value: Value) -> Self {
        match value {
            Value::Object(obj) => Shape::Object(obj),
            Value::Array(arr) => Shape::Array(arr),
            Value::Null => Shape::Scalar(Scalar::Null),
            Value::Bool(b) => Shape::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Shape::Scalar(Scalar::Number(n)),
            Value::String(s) => Shape::Scalar(Scalar::String(s)),
        }
    }
}

/// A fully flattened root-level record: path key to scalar, in first-insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FlatRecord {
    entries: IndexMap<String, Scalar>,
}

impl FlatRecord {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        FlatRecord {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Insert a leaf. An existing key keeps its slot and takes the new value.
    pub(crate) fn insert(&mut self, key: String, value: Scalar) -> Option<Scalar> {
        self.entries.insert(key, value)
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Convert into a flat JSON object
    pub fn into_value(self) -> Value {
        Value::Object(
            self.entries
                .into_iter()
                .map(|(k, v)| (k, Value::from(v)))
                .collect(),
        )
    }
}

impl<K: Into<String>> FromIterator<(K, Scalar)> for FlatRecord {
    fn from_iter<I: IntoIterator<Item = (K, Scalar)>>(iter: I) -> Self {
        FlatRecord {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl IntoIterator for FlatRecord {
    type Item = (String, Scalar);
    type IntoIter = indexmap::map::IntoIter<String, Scalar>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Configuration for flattening
#[derive(Debug, Clone)]
pub struct FlattenConfig {
    /// Joins object keys and array indices into a path key
    pub separator: String,

    /// Longest path accepted, in segments (a bare scalar root is depth 0)
    pub max_depth: usize,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        FlattenConfig {
            separator: String::from("."),
            max_depth: 512,
        }
    }
}

impl FlattenConfig {
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.separator.is_empty() {
            return Err(Error::InvalidConfig("separator must not be empty".to_string()));
        }
        Ok(())
    }
}
