//! Typed value shared by every decoder.

use std::fmt;

use indexmap::IndexMap;

use crate::meta_data::normalize_key;

/// A decoded leaf or container.
///
/// Decoders never hand out bare numbers or strings: every leaf is one of
/// these variants so call sites can match on it directly.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// A slot that was never assigned (e.g. a skipped array index).
    #[default]
    Empty,
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Raw text; scanner strings are not guaranteed to be UTF-8.
    Text(Vec<u8>),
    Array(Vec<Value>),
    Struct(IndexMap<String, Value>),
}

impl Value {
    pub fn text(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Text(bytes.into())
    }

    pub fn new_struct() -> Self {
        Value::Struct(IndexMap::new())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Empty => "empty",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Text(_) => "text",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view; integers widen to floating point.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Text view, only when the bytes are valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Struct(v) => Some(v),
            _ => None,
        }
    }

    /// Borrowing child lookup: struct members by name, array items by
    /// decimal position.
    pub fn entry(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Struct(map) => map
                .get(key)
                .or_else(|| map.get(normalize_key(key).as_ref())),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    /// Consuming counterpart of [`Value::entry`].
    pub fn into_entry(self, key: &str) -> Option<Value> {
        match self {
            Value::Struct(mut map) => match map.swap_remove(key) {
                Some(value) => Some(value),
                None => map.swap_remove(normalize_key(key).as_ref()),
            },
            Value::Array(items) => {
                let index = key.parse::<usize>().ok()?;
                items.into_iter().nth(index)
            }
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.as_bytes().to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

/// Scalars print plainly, text as lossy UTF-8, containers as JSON.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => f.write_str("null"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(&String::from_utf8_lossy(v)),
            Value::Array(_) | Value::Struct(_) => write!(f, "{}", self.to_json()),
        }
    }
}
