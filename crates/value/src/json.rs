//! Conversions between [`Value`] and `serde_json::Value`.
//!
//! Loading understands two shapes of meta-data document: plain
//! `{"key": [values...]}` maps, and DICOM JSON Model elements
//! (`{"vr": "OB", "InlineBinary": "..."}`, `{"vr": "FD", "Value": [..]}`),
//! which are unwrapped into their raw value sequence.

use indexmap::IndexMap;
use serde_json::{Map, Number, Value as JsonValue};

use crate::meta_data::normalize_key;
use crate::Value;

impl From<&JsonValue> for Value {
    fn from(json: &JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Empty,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => number_to_value(n),
            JsonValue::String(s) => Value::Text(s.as_bytes().to_vec()),
            JsonValue::Array(items) => Value::Array(items.iter().map(Value::from).collect()),
            JsonValue::Object(map) => match unwrap_dicom_element(map) {
                Some(value) => value,
                None => Value::Struct(
                    map.iter()
                        .map(|(k, v)| (normalize_key(k).into_owned(), Value::from(v)))
                        .collect::<IndexMap<_, _>>(),
                ),
            },
        }
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        Value::from(&json)
    }
}

fn number_to_value(n: &Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Integer(i)
    } else if let Some(u) = n.as_u64() {
        // Above i64::MAX: keep magnitude rather than wrap.
        Value::Float(u as f64)
    } else {
        Value::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// Recognises a DICOM JSON Model element: an object with a two-letter `vr`
/// member and nothing but the model's own members next to it.
fn unwrap_dicom_element(map: &Map<String, JsonValue>) -> Option<Value> {
    let vr = map.get("vr")?.as_str()?;
    if vr.len() != 2 || !vr.bytes().all(|b| b.is_ascii_uppercase()) {
        return None;
    }
    let known = ["vr", "Value", "InlineBinary", "BulkDataURI"];
    if !map.keys().all(|k| known.contains(&k.as_str())) {
        return None;
    }
    if let Some(values) = map.get("Value").and_then(JsonValue::as_array) {
        return Some(Value::Array(values.iter().map(Value::from).collect()));
    }
    if let Some(binary) = map.get("InlineBinary").and_then(JsonValue::as_str) {
        return Some(Value::Array(vec![Value::Text(binary.as_bytes().to_vec())]));
    }
    Some(Value::Array(Vec::new()))
}

impl Value {
    /// Converts to JSON for printing. Text is decoded lossily; `Empty` and
    /// non-finite floats become `null`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Empty => JsonValue::Null,
            Value::Integer(v) => JsonValue::from(*v),
            Value::Float(v) => Number::from_f64(*v)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::Bool(v) => JsonValue::Bool(*v),
            Value::Text(v) => JsonValue::String(String::from_utf8_lossy(v).into_owned()),
            Value::Array(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Value::Struct(map) => JsonValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<_, _>>(),
            ),
        }
    }
}
