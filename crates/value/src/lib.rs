//! Typed values shared by the mrmeta decoders, and the tag-keyed
//! meta-data container they are applied to.
//!
//! # Example
//!
//! ```
//! use mrmeta_value::{MetaData, Value};
//! use serde_json::json;
//!
//! let meta = MetaData::from_json(&json!({"EchoTime": [[2.3], [6.9]]})).unwrap();
//! let echo = meta.get("EchoTime").and_then(|v| v.entry("1")).and_then(|v| v.entry("0"));
//! assert_eq!(echo, Some(&Value::Float(6.9)));
//! ```

mod indexable;
mod json;
mod meta_data;
mod value;

pub use indexable::Indexable;
pub use meta_data::{format_tag, is_tag, parse_tag, MetaData, MetaDataError};
pub use value::Value;

pub use indexmap::IndexMap;
