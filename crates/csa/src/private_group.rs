//! Private creator lookup.
//!
//! A vendor reserves a block of element numbers inside an odd group by
//! writing its creator string at `gggg,00xx`; its private elements then
//! live at `gggg,xx00`-`gggg,xxff`. The reserved offset `xx` is not fixed,
//! so it has to be found by scanning.

use std::fmt;

use mrmeta_value::{format_tag, MetaData, Value};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LocateError;
use crate::options::CsaOptions;
use crate::transport::{decode_base64, trim_padding};

/// Element offset of the CSA image header inside a private block.
pub const IMAGE_HEADER_INFO: u8 = 0x10;
/// Element offset of the CSA series header, which holds `MrPhoenixProtocol`.
pub const SERIES_HEADER_INFO: u8 = 0x20;

/// `(group << 16) | (element << 8)`: the first tag of a private block.
///
/// Deserializing a raw tag keeps only its block bits, so `0x00291020`
/// names the same block as `0x00291000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct PrivateGroupAddress(u32);

impl PrivateGroupAddress {
    pub const fn new(group: u16, element: u8) -> Self {
        Self(((group as u32) << 16) | ((element as u32) << 8))
    }

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw & 0xffff_ff00)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn group(self) -> u16 {
        (self.0 >> 16) as u16
    }

    /// Reserved element offset `xx` of the block.
    pub const fn element(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Tag of the creator element, `gggg00xx`.
    pub fn creator_tag(self) -> String {
        format!("{:04x}00{:02x}", self.group(), self.element())
    }

    /// Tag of the element at `offset` inside the block.
    pub fn tag(self, offset: u8) -> String {
        format_tag(self.0 + offset as u32)
    }
}

impl From<u32> for PrivateGroupAddress {
    fn from(raw: u32) -> Self {
        Self::from_raw(raw)
    }
}

impl From<PrivateGroupAddress> for u32 {
    fn from(address: PrivateGroupAddress) -> Self {
        address.raw()
    }
}

impl fmt::Display for PrivateGroupAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// Returns true when a raw creator value names `creator`, either verbatim
/// or base64-encoded (binary value representations are transported as
/// base64 by JSON loaders).
pub fn matches_creator(value: &Value, creator: &[u8]) -> bool {
    let Some(bytes) = value.as_bytes() else {
        return false;
    };
    let creator = trim_padding(creator);
    if trim_padding(bytes) == creator {
        return true;
    }
    decode_base64(bytes).is_some_and(|decoded| trim_padding(&decoded) == creator)
}

/// Scans `gggg0000`-`gggg00ff` in ascending order for the creator element.
pub fn locate(meta: &MetaData, creator: &[u8], group: u16) -> Option<PrivateGroupAddress> {
    (0..=u8::MAX).find_map(|element| {
        let address = PrivateGroupAddress::new(group, element);
        let tag = address.creator_tag();
        let value = meta.first_value(&tag)?;
        if !matches_creator(value, creator) {
            return None;
        }
        debug!(tag = %tag, address = %address, "found private creator");
        Some(address)
    })
}

/// Applies the fallback policy of `options` on top of [`locate`].
pub fn locate_or_fallback(
    meta: &MetaData,
    options: &CsaOptions,
) -> Result<PrivateGroupAddress, LocateError> {
    locate(meta, options.creator.as_bytes(), options.group)
        .or(options.fallback)
        .ok_or_else(|| LocateError::PrivateGroupNotFound {
            creator: options.creator.clone(),
            group: options.group,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_matrix() {
        let address = PrivateGroupAddress::new(0x0029, 0x10);
        assert_eq!(address.raw(), 0x0029_1000);
        assert_eq!(address.group(), 0x0029);
        assert_eq!(address.element(), 0x10);
        assert_eq!(address.creator_tag(), "00290010");
        assert_eq!(address.tag(SERIES_HEADER_INFO), "00291020");
        assert_eq!(address.tag(IMAGE_HEADER_INFO), "00291010");
        assert_eq!(address.to_string(), "00291000");
        assert_eq!(PrivateGroupAddress::from_raw(0x0029_1120), PrivateGroupAddress::new(0x0029, 0x11));
    }

    #[test]
    fn creator_matrix() {
        let creator = b"SIEMENS CSA HEADER";
        assert!(matches_creator(&Value::from("SIEMENS CSA HEADER"), creator));
        assert!(matches_creator(&Value::from("U0lFTUVOUyBDU0EgSEVBREVS"), creator));
        assert!(matches_creator(&Value::from("SIEMENS CSA HEADER\0"), creator));
        assert!(!matches_creator(&Value::from("SIEMENS MEDCOM HEADER"), creator));
        assert!(!matches_creator(&Value::Integer(1), creator));
    }
}
