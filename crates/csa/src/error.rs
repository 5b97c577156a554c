//! Error types for CSA decoding, ASCCONV parsing and private group lookup.

use mrmeta_buffers::BufferError;
use thiserror::Error;

/// Structural failure while decoding an `SV10` container. Any of these
/// aborts the whole decode.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("bad magic {found:?}, expected \"SV10\"")]
    BadMagic { found: [u8; 4] },
    #[error("truncated buffer: {needed} bytes needed at offset {offset}, {available} available")]
    TruncatedBuffer {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("element {element:?}: cannot parse {literal:?} as {vr}")]
    UnparsableNumericLiteral {
        element: String,
        vr: String,
        literal: String,
    },
}

impl From<BufferError> for DecodeError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::EndOfBuffer {
                offset,
                needed,
                available,
            } => DecodeError::TruncatedBuffer {
                offset,
                needed,
                available,
            },
        }
    }
}

/// Failure while extracting or parsing an ASCCONV block. Line numbers are
/// 1-based and relative to the start of the block.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("no ASCCONV block found")]
    NoProtocolBlock,
    #[error("line {line}: malformed assignment {text:?}")]
    MalformedLine { line: usize, text: String },
    #[error("line {line}: cannot read {literal:?} as {expected} for {key}")]
    InvalidLiteral {
        line: usize,
        key: String,
        literal: String,
        expected: &'static str,
    },
    #[error("line {line}: index {index} of {key} is out of range")]
    IndexOutOfRange { line: usize, key: String, index: usize },
    #[error("line {line}: {key} is used both as a value and as a container")]
    Conflict { line: usize, key: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocateError {
    #[error("private group for creator {creator:?} not found in group {group:04x}")]
    PrivateGroupNotFound { creator: String, group: u16 },
}

/// Failure of [`read_protocol`](crate::read_protocol), one variant per step.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProtocolError {
    #[error(transparent)]
    Locate(#[from] LocateError),
    #[error("element {0} is missing or is not binary")]
    MissingElement(String),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("CSA container has no {0} entry")]
    MissingEntry(&'static str),
    #[error(transparent)]
    Parse(#[from] ParseError),
}
