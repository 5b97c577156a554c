//! Resolution of dot-separated paths such as
//! `00291020.0.MrPhoenixProtocol.0.alTR.0` over a [`MetaData`] root.
//!
//! Keys and sequence indices are followed directly. Where neither applies,
//! an ordered chain of accessors gets a chance to turn the current value
//! into a new container: first the CSA container decoder, then the
//! ASCCONV protocol parser.
//!
//! ```
//! use mrmeta_path::resolve;
//! use mrmeta_value::{MetaData, Value};
//!
//! let mut meta = MetaData::new();
//! meta.insert("EchoTime", Value::Array(vec![Value::Float(6.9)]));
//! assert_eq!(resolve(&meta, "EchoTime.0"), Ok(Value::Float(6.9)));
//! ```

pub mod accessor;
mod error;
mod resolver;

pub use accessor::{AccessContext, AccessFn, Accessor, DEFAULT_ACCESSORS};
pub use error::{AccessError, AccessFailure, ResolveError};
pub use mrmeta_value::MetaData;
pub use resolver::{resolve, Resolver};
