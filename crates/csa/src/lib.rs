//! Decoders for the Siemens private meta-data block.
//!
//! - [`CsaHeader`] decodes the `SV10` binary container stored in the CSA
//!   image and series header elements.
//! - [`ascconv`] parses the ASCCONV protocol text found in the container's
//!   `MrPhoenixProtocol` entry.
//! - [`locate`] finds the (relocatable) private block holding both.
//!
//! # Example
//!
//! ```
//! use mrmeta_csa::ascconv;
//! use mrmeta_value::Value;
//!
//! let text = b"### ASCCONV BEGIN ###\nalTR[0] = 28000\n### ASCCONV END ###";
//! let tree = ascconv::extract_and_parse(text).unwrap();
//! assert_eq!(ascconv::lookup(&tree, "alTR[0]"), Some(&Value::Integer(28000)));
//! ```

pub mod ascconv;
mod error;
mod header;
mod options;
mod phoenix;
mod private_group;
mod transport;

pub use error::{DecodeError, LocateError, ParseError, ProtocolError};
pub use header::{decode_raw_or_base64, CsaElement, CsaHeader, MAGIC};
pub use options::{CsaOptions, CSA_CREATOR, CSA_GROUP, DEFAULT_CSA_ADDRESS};
pub use phoenix::{read_protocol, PHOENIX_PROTOCOL};
pub use private_group::{
    locate, locate_or_fallback, matches_creator, PrivateGroupAddress, IMAGE_HEADER_INFO,
    SERIES_HEADER_INFO,
};
pub use transport::decode_base64;
