//! Tag-keyed meta-data container supplied by an outside loader.

use std::borrow::Cow;
use std::io::Read;

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::Value;

#[derive(Debug, Error)]
pub enum MetaDataError {
    #[error("meta-data document must be a JSON object, got {0}")]
    NotAnObject(&'static str),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Returns true for an 8-hex-digit `group(4)+element(4)` tag, any case.
pub fn is_tag(key: &str) -> bool {
    key.len() == 8 && key.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Formats a 32-bit tag the way container keys are written.
pub fn format_tag(tag: u32) -> String {
    format!("{tag:08x}")
}

/// Parses an 8-hex-digit tag key.
pub fn parse_tag(key: &str) -> Option<u32> {
    if !is_tag(key) {
        return None;
    }
    u32::from_str_radix(key, 16).ok()
}

/// Tag-shaped keys compare case-insensitively; keyword keys verbatim.
pub(crate) fn normalize_key(key: &str) -> Cow<'_, str> {
    if is_tag(key) && key.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(key.to_ascii_lowercase())
    } else {
        Cow::Borrowed(key)
    }
}

/// The root mapping handed to the resolver: key to a sequence of raw
/// values (normally a [`Value::Array`]).
///
/// Keys are usually tags (`"00291020"`), but loaders also emit keyword
/// keys such as `"EchoTime"`; both are accepted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaData {
    entries: IndexMap<String, Value>,
}

impl MetaData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl AsRef<str>, value: Value) -> Option<Value> {
        let key = normalize_key(key.as_ref()).into_owned();
        self.entries.insert(key, value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(normalize_key(key).as_ref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(normalize_key(key).as_ref())
    }

    /// First raw value stored under `key`. A non-sequence entry is its own
    /// first value.
    pub fn first_value(&self, key: &str) -> Option<&Value> {
        match self.get(key)? {
            Value::Array(items) => items.first(),
            other => Some(other),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_value(self) -> Value {
        Value::Struct(self.entries)
    }

    pub fn from_json(json: &JsonValue) -> Result<Self, MetaDataError> {
        let object = match json {
            JsonValue::Object(object) => object,
            JsonValue::Null => return Err(MetaDataError::NotAnObject("null")),
            JsonValue::Bool(_) => return Err(MetaDataError::NotAnObject("bool")),
            JsonValue::Number(_) => return Err(MetaDataError::NotAnObject("number")),
            JsonValue::String(_) => return Err(MetaDataError::NotAnObject("string")),
            JsonValue::Array(_) => return Err(MetaDataError::NotAnObject("array")),
        };
        Ok(object
            .iter()
            .map(|(k, v)| (k.as_str(), Value::from(v)))
            .collect())
    }

    pub fn from_json_str(text: &str) -> Result<Self, MetaDataError> {
        let json: JsonValue = serde_json::from_str(text)?;
        Self::from_json(&json)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, MetaDataError> {
        let json: JsonValue = serde_json::from_reader(reader)?;
        Self::from_json(&json)
    }
}

impl<K: AsRef<str>> FromIterator<(K, Value)> for MetaData {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        let mut meta = MetaData::new();
        for (key, value) in iter {
            meta.insert(key, value);
        }
        meta
    }
}
