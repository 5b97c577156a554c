//! Reading the scanner protocol straight from a meta-data container.

use mrmeta_value::{MetaData, Value};
use tracing::debug;

use crate::ascconv::extract_and_parse;
use crate::error::ProtocolError;
use crate::header::decode_raw_or_base64;
use crate::options::CsaOptions;
use crate::private_group::{locate_or_fallback, SERIES_HEADER_INFO};

/// Name of the CSA entry holding the ASCCONV protocol text.
pub const PHOENIX_PROTOCOL: &str = "MrPhoenixProtocol";

/// Locates the CSA series header, decodes it and parses the ASCCONV block
/// of its `MrPhoenixProtocol` entry.
pub fn read_protocol(meta: &MetaData, options: &CsaOptions) -> Result<Value, ProtocolError> {
    let address = locate_or_fallback(meta, options)?;
    let tag = address.tag(SERIES_HEADER_INFO);
    debug!(tag = %tag, "reading protocol");

    let raw = meta
        .first_value(&tag)
        .and_then(Value::as_bytes)
        .ok_or_else(|| ProtocolError::MissingElement(tag.clone()))?;
    let header = decode_raw_or_base64(raw)?;
    let text = header
        .first(PHOENIX_PROTOCOL)
        .and_then(Value::as_bytes)
        .ok_or(ProtocolError::MissingEntry(PHOENIX_PROTOCOL))?;
    Ok(extract_and_parse(text)?)
}
