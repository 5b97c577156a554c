//! Fallback accessors tried when a path segment is neither a key nor an
//! index of the current value.

use std::borrow::Cow;
use std::fmt;

use mrmeta_csa::ascconv::extract_and_parse;
use mrmeta_csa::{
    decode_raw_or_base64, matches_creator, CsaOptions, PrivateGroupAddress, PHOENIX_PROTOCOL,
};
use mrmeta_value::{parse_tag, Indexable, MetaData, Value};

use crate::error::AccessError;

/// Everything an accessor may look at for one segment.
#[derive(Debug, Clone, Copy)]
pub struct AccessContext<'a> {
    pub root: &'a MetaData,
    /// Last segment that named something, index steps excluded.
    pub parent: &'a str,
    pub segment: &'a str,
    pub value: &'a Value,
    pub options: &'a CsaOptions,
}

pub type AccessFn = fn(&AccessContext<'_>) -> Result<Value, AccessError>;

/// A named entry of the resolver's fallback chain.
#[derive(Clone, Copy)]
pub struct Accessor {
    pub name: &'static str,
    pub access: AccessFn,
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Accessor").field(&self.name).finish()
    }
}

impl Accessor {
    pub const fn new(name: &'static str, access: AccessFn) -> Self {
        Self { name, access }
    }
}

/// Default chain, in priority order.
pub const DEFAULT_ACCESSORS: [Accessor; 2] = [
    Accessor::new("csa", csa),
    Accessor::new("protocol", protocol),
];

/// Decodes a CSA container stored in a private element of the CSA block.
///
/// Applies when `parent` is a tag inside a private block of the configured
/// group whose creator element names the configured creator. A block
/// without any creator element is accepted only at the fallback address.
pub fn csa(cx: &AccessContext<'_>) -> Result<Value, AccessError> {
    let address = parse_tag(cx.parent)
        .map(PrivateGroupAddress::from_raw)
        .filter(|a| a.group() == cx.options.group && a.element() >= 0x10)
        .ok_or(AccessError::NotApplicable("parent is not a private element of the CSA group"))?;
    match cx.root.first_value(&address.creator_tag()) {
        Some(creator) if matches_creator(creator, cx.options.creator.as_bytes()) => {}
        Some(_) => return Err(AccessError::NotApplicable("private creator does not match")),
        None if cx.options.fallback == Some(address) => {}
        None => return Err(AccessError::NotApplicable("private creator is missing")),
    }
    let bytes = cx
        .value
        .as_bytes()
        .ok_or(AccessError::NotApplicable("value is not binary"))?;
    let header = decode_raw_or_base64(bytes)?;
    take_entry(&header, cx.segment)
}

/// Parses the ASCCONV block of a `MrPhoenixProtocol` item.
pub fn protocol(cx: &AccessContext<'_>) -> Result<Value, AccessError> {
    if cx.parent != PHOENIX_PROTOCOL {
        return Err(AccessError::NotApplicable("parent is not MrPhoenixProtocol"));
    }
    let text = cx
        .value
        .as_bytes()
        .ok_or(AccessError::NotApplicable("value is not text"))?;
    let tree = extract_and_parse(text)?;
    take_entry(&tree, cx.segment)
}

fn take_entry(container: &impl Indexable, key: &str) -> Result<Value, AccessError> {
    container
        .get(key)
        .map(Cow::into_owned)
        .ok_or_else(|| AccessError::MissingEntry(key.to_string()))
}
