//! Decoder for the `SV10` private container ("CSA header").
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! prologue   "SV10" | 4 reserved | u32 element count | 4 reserved
//! element    64-byte NUL-padded name | u32 vm | 2-byte vr | 2 reserved
//!            | u32 syngo datatype | u32 item count | 4 reserved
//! item       4 x u32 lengths (second one is the content length)
//!            | content | padding to a 4-byte boundary
//! ```
//!
//! Only the first `vm` items of an element carry values; the others are
//! skipped.

use std::borrow::Cow;

use mrmeta_buffers::Reader;
use mrmeta_value::{IndexMap, Indexable, Value};
use tracing::{debug, trace};

use crate::error::DecodeError;
use crate::transport::decode_base64;

pub const MAGIC: [u8; 4] = *b"SV10";

const NAME_LENGTH: usize = 64;

/// One decoded element: its declared header fields and its first `vm`
/// item values.
#[derive(Debug, Clone, PartialEq)]
pub struct CsaElement {
    pub vm: u32,
    pub vr: [u8; 2],
    pub syngo_datatype: u32,
    pub items: Vec<Value>,
}

impl CsaElement {
    /// Value representation as text, without NUL padding.
    pub fn vr(&self) -> String {
        String::from_utf8_lossy(crate::transport::trim_padding(&self.vr)).into_owned()
    }
}

/// Decoded container: element name to element, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsaHeader {
    elements: IndexMap<String, CsaElement>,
}

impl CsaHeader {
    /// Decodes a raw `SV10` buffer. Transport encodings are the caller's
    /// business; see [`decode_raw_or_base64`].
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(data);
        let magic = reader.array::<4>()?;
        if magic != MAGIC {
            return Err(DecodeError::BadMagic { found: magic });
        }
        reader.skip(4)?;
        let count = reader.u32_le()?;
        reader.skip(4)?;

        let mut elements = IndexMap::new();
        for _ in 0..count {
            let offset = reader.position();
            let (name, element) = read_element(&mut reader)?;
            trace!(
                offset,
                name = %name,
                vr = %element.vr(),
                vm = element.vm,
                items = element.items.len(),
                "CSA element"
            );
            elements.insert(name, element);
        }
        debug!(elements = elements.len(), "decoded CSA header");
        Ok(Self { elements })
    }

    pub fn get(&self, name: &str) -> Option<&CsaElement> {
        self.elements.get(name)
    }

    pub fn values(&self, name: &str) -> Option<&[Value]> {
        self.get(name).map(|e| e.items.as_slice())
    }

    pub fn first(&self, name: &str) -> Option<&Value> {
        self.values(name).and_then(<[Value]>::first)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }

    /// Struct of element name to the array of its values.
    pub fn into_value(self) -> Value {
        Value::Struct(
            self.elements
                .into_iter()
                .map(|(name, element)| (name, Value::Array(element.items)))
                .collect(),
        )
    }
}

impl Indexable for CsaHeader {
    fn get(&self, key: &str) -> Option<Cow<'_, Value>> {
        self.values(key)
            .map(|items| Cow::Owned(Value::Array(items.to_vec())))
    }

    fn contains(&self, key: &str) -> bool {
        self.elements.contains_key(key)
    }
}

/// Decodes `data` as a raw container, falling back to base64 transport
/// encoding. When both fail the raw error is reported unless the base64
/// payload itself was readable.
pub fn decode_raw_or_base64(data: &[u8]) -> Result<CsaHeader, DecodeError> {
    match CsaHeader::decode(data) {
        Ok(header) => Ok(header),
        Err(raw_err) => match decode_base64(data) {
            Some(decoded) => CsaHeader::decode(&decoded),
            None => Err(raw_err),
        },
    }
}

fn read_element(reader: &mut Reader<'_>) -> Result<(String, CsaElement), DecodeError> {
    let raw_name = reader.array::<NAME_LENGTH>()?;
    let name_end = raw_name.iter().position(|&b| b == 0).unwrap_or(NAME_LENGTH);
    let name = String::from_utf8_lossy(&raw_name[..name_end]).into_owned();

    let vm = reader.u32_le()?;
    let vr = reader.array::<2>()?;
    reader.skip(2)?;
    let syngo_datatype = reader.u32_le()?;
    let item_count = reader.u32_le()?;
    reader.skip(4)?;

    let kind = ItemKind::of(&vr);
    let mut items = Vec::new();
    for index in 0..item_count {
        let content = read_item(reader)?;
        if index < vm {
            items.push(kind.coerce(content, &name, &vr)?);
        }
    }

    Ok((
        name,
        CsaElement {
            vm,
            vr,
            syngo_datatype,
            items,
        },
    ))
}

fn read_item<'a>(reader: &mut Reader<'a>) -> Result<&'a [u8], DecodeError> {
    reader.skip(4)?;
    let length = reader.u32_le()? as usize;
    reader.skip(8)?;
    let content = reader.buf(length)?;
    reader.skip((4 - length % 4) % 4)?;
    Ok(content)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemKind {
    Float,
    Integer,
    Text,
}

impl ItemKind {
    fn of(vr: &[u8; 2]) -> Self {
        match vr {
            b"DS" | b"FL" | b"FD" => ItemKind::Float,
            b"IS" | b"SS" | b"US" | b"SL" | b"UL" => ItemKind::Integer,
            _ => ItemKind::Text,
        }
    }

    /// Numeric items are delimiter-terminated, space-padded literals.
    fn coerce(self, content: &[u8], element: &str, vr: &[u8; 2]) -> Result<Value, DecodeError> {
        if self == ItemKind::Text {
            return Ok(Value::Text(content.to_vec()));
        }
        let literal = &content[..content.len().saturating_sub(1)];
        let parsed = std::str::from_utf8(literal).ok().map(str::trim).and_then(|s| {
            match self {
                ItemKind::Float => s.parse::<f64>().ok().map(Value::Float),
                _ => s.parse::<i64>().ok().map(Value::Integer),
            }
        });
        parsed.ok_or_else(|| DecodeError::UnparsableNumericLiteral {
            element: element.to_string(),
            vr: String::from_utf8_lossy(vr).into_owned(),
            literal: String::from_utf8_lossy(literal).into_owned(),
        })
    }
}
