//! Transport decoding of raw values handed over by JSON loaders.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Decodes standard base64, ignoring embedded whitespace. Returns `None`
/// when the input is not base64.
pub fn decode_base64(data: &[u8]) -> Option<Vec<u8>> {
    let compact: Vec<u8> = data
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    STANDARD.decode(compact).ok()
}

/// Strips the NUL/space padding DICOM adds to reach an even length.
pub(crate) fn trim_padding(data: &[u8]) -> &[u8] {
    let end = data
        .iter()
        .rposition(|&b| b != 0 && b != b' ')
        .map_or(0, |p| p + 1);
    &data[..end]
}
