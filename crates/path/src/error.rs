use mrmeta_csa::{DecodeError, ParseError};
use thiserror::Error;

/// Why one accessor could not produce a value for a path segment.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AccessError {
    /// The accessor does not apply to this value at all.
    #[error("not applicable: {0}")]
    NotApplicable(&'static str),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The value was decoded but has no entry of that name.
    #[error("no entry named {0:?}")]
    MissingEntry(String),
}

/// One rejected accessor, kept for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessFailure {
    pub accessor: &'static str,
    pub error: AccessError,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolveError {
    /// No step applied to a path segment. `path` is the query up to and
    /// including that segment; `attempts` lists every accessor tried.
    #[error("no such item: {path}")]
    NoSuchItem {
        path: String,
        attempts: Vec<AccessFailure>,
    },
}

impl ResolveError {
    pub fn path(&self) -> &str {
        match self {
            ResolveError::NoSuchItem { path, .. } => path,
        }
    }

    pub fn attempts(&self) -> &[AccessFailure] {
        match self {
            ResolveError::NoSuchItem { attempts, .. } => attempts,
        }
    }
}
