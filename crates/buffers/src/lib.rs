//! Binary buffer utilities for mrmeta.
//!
//! - [`Reader`] - Reads little-endian binary data from a byte slice with
//!   cursor tracking and bounds checks.
//!
//! # Example
//!
//! ```
//! use mrmeta_buffers::Reader;
//!
//! let data = b"SV10\x04\x03\x02\x01\x02\x00\x00\x00";
//! let mut reader = Reader::new(data);
//! assert_eq!(&reader.array::<4>().unwrap(), b"SV10");
//! reader.skip(4).unwrap();
//! assert_eq!(reader.u32_le().unwrap(), 2);
//! ```

mod reader;

pub use reader::Reader;

use thiserror::Error;

/// Error type for buffer operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Attempted to read past the end of the buffer.
    #[error("end of buffer: {needed} bytes needed at offset {offset}, {available} available")]
    EndOfBuffer {
        offset: usize,
        needed: usize,
        available: usize,
    },
}
