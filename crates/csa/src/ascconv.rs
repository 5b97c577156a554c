//! Parser for the ASCCONV protocol text embedded in `MrPhoenixProtocol`.
//!
//! The block is a list of assignments such as
//!
//! ```text
//! sTXSPEC.asNucleusInfo[0].tNucleus = ""1H""
//! alTR[0] = 28000
//! sKSpace.ucDimension = 0x2
//! ```
//!
//! Each key segment reads `[a][type]name[[index]]`: a leading `a` marks an
//! array entry and requires an index, the type prefix selects how the value
//! literal is read, and the tree is keyed by the segment name as written
//! (`asNucleusInfo`, `alTR`). A bracket on a segment without the `a` marker
//! is ignored.

use std::sync::OnceLock;

use mrmeta_value::{IndexMap, Value};
use regex::Regex;
use regex::bytes::Regex as BytesRegex;

use crate::error::ParseError;

const BEGIN: &[u8] = b"### ASCCONV BEGIN";
const END: &[u8] = b"### ASCCONV END ###";
const MARKER_CLOSE: &[u8] = b"###";

/// Largest array index accepted in a key. Arrays grow to `index + 1` slots,
/// so this bounds what a single line can allocate.
pub const MAX_INDEX: usize = (1 << 20) - 1;

/// Extracts and parses the first ASCCONV block of `data`.
pub fn extract_and_parse(data: &[u8]) -> Result<Value, ParseError> {
    parse(extract_block(data)?)
}

/// Returns the whitespace-trimmed text between the first begin marker and
/// the first end marker after it.
///
/// The begin marker may carry attributes before its closing `###`, as in
/// `### ASCCONV BEGIN object=MrProtDataImpl@MrProtocolData ###`.
/// A begin line without its closing `###` is skipped.
pub fn extract_block(data: &[u8]) -> Result<&[u8], ParseError> {
    let mut from = 0;
    while let Some(found) = find(&data[from..], BEGIN) {
        let begin = from + found + BEGIN.len();
        let line_end = data[begin..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(data.len(), |p| begin + p);
        let Some(close) = find(&data[begin..line_end], MARKER_CLOSE) else {
            from = line_end;
            continue;
        };
        let start = begin + close + MARKER_CLOSE.len();
        let end = start + find(&data[start..], END).ok_or(ParseError::NoProtocolBlock)?;
        return Ok(data[start..end].trim_ascii());
    }
    Err(ParseError::NoProtocolBlock)
}

/// Parses the assignments of an extracted block into a struct tree.
///
/// Lines are folded left to right. A plain key keeps its first value; an
/// array slot takes the last value assigned to it.
pub fn parse(block: &[u8]) -> Result<Value, ParseError> {
    let mut root = IndexMap::new();
    for (number, line) in block.split(|&b| b == b'\n').enumerate() {
        let line = line.trim_ascii();
        if line.is_empty() {
            continue;
        }
        let number = number + 1;
        let (key, literal) = split_assignment(line).ok_or_else(|| ParseError::MalformedLine {
            line: number,
            text: String::from_utf8_lossy(line).into_owned(),
        })?;
        let segments = key
            .split('.')
            .map(Segment::parse)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| ParseError::MalformedLine {
                line: number,
                text: String::from_utf8_lossy(line).into_owned(),
            })?;
        assign(&mut root, &segments, literal, number, key)?;
    }
    Ok(Value::Struct(root))
}

/// Follows a protocol path in the grammar's own syntax, e.g.
/// `sTXSPEC.asNucleusInfo[0].tNucleus`.
pub fn lookup<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(tree, |value, segment| {
        match segment.strip_suffix(']').and_then(|s| s.split_once('[')) {
            Some((name, index)) => value
                .entry(name)?
                .as_array()?
                .get(index.parse::<usize>().ok()?),
            None => value.entry(segment),
        }
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn split_assignment(line: &[u8]) -> Option<(&str, &[u8])> {
    static LINE: OnceLock<BytesRegex> = OnceLock::new();
    let pattern = LINE.get_or_init(|| {
        BytesRegex::new(r"^([\w\[\]\.]+)\s*=\s*((?-u:.)*)$").expect("valid assignment pattern")
    });
    let captures = pattern.captures(line)?;
    let key = std::str::from_utf8(captures.get(1)?.as_bytes()).ok()?;
    Some((key, captures.get(2)?.as_bytes().trim_ascii()))
}

/// Declared type of a key segment, from its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeTag {
    Integer,
    Float,
    Bool,
    Text,
    /// `s`, a nested structure.
    Struct,
}

impl TypeTag {
    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "s" => Some(TypeTag::Struct),
            "c" | "i" | "l" | "n" | "uc" | "ui" | "ul" | "un" | "us" => Some(TypeTag::Integer),
            "fl" | "d" => Some(TypeTag::Float),
            "b" => Some(TypeTag::Bool),
            "t" => Some(TypeTag::Text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment<'k> {
    /// Name as written, prefixes included; the tree key.
    name: &'k str,
    tag: Option<TypeTag>,
    /// Slot of an `a`-marked segment; `None` for every other segment.
    index: Option<usize>,
}

impl<'k> Segment<'k> {
    fn parse(text: &'k str) -> Option<Self> {
        static SEGMENT: OnceLock<Regex> = OnceLock::new();
        let pattern = SEGMENT.get_or_init(|| {
            Regex::new(r"^((a?)(c|i|l|n|s|uc|ui|ul|un|us|fl|d|b|t)?\w+)(?:\[(\d+)\])?$")
                .expect("valid segment pattern")
        });
        let captures = pattern.captures(text)?;
        let array = captures.get(2).is_some_and(|marker| !marker.is_empty());
        let index = match (array, captures.get(4)) {
            // Overlong indices are reported as out of range by the caller.
            (true, Some(index)) => Some(index.as_str().parse::<usize>().unwrap_or(usize::MAX)),
            (true, None) => return None,
            (false, _) => None,
        };
        Some(Self {
            name: captures.get(1)?.as_str(),
            tag: captures
                .get(3)
                .and_then(|prefix| TypeTag::from_prefix(prefix.as_str())),
            index,
        })
    }
}

fn assign(
    root: &mut IndexMap<String, Value>,
    segments: &[Segment<'_>],
    literal: &[u8],
    line: usize,
    key: &str,
) -> Result<(), ParseError> {
    let conflict = || ParseError::Conflict {
        line,
        key: key.to_string(),
    };
    let Some((leaf, parents)) = segments.split_last() else {
        return Ok(());
    };

    let mut cursor = root;
    for segment in parents {
        let slot = match segment.index {
            Some(index) => array_slot(cursor, segment, index, line, key)?,
            None => cursor
                .entry(segment.name.to_string())
                .or_insert_with(Value::new_struct),
        };
        if slot.is_empty() {
            *slot = Value::new_struct();
        }
        cursor = match slot {
            Value::Struct(map) => map,
            _ => return Err(conflict()),
        };
    }

    let value = coerce(leaf.tag, literal).ok_or_else(|| ParseError::InvalidLiteral {
        line,
        key: key.to_string(),
        literal: String::from_utf8_lossy(literal).into_owned(),
        expected: expected_kind(leaf.tag),
    })?;
    match leaf.index {
        Some(index) => {
            let slot = array_slot(cursor, leaf, index, line, key)?;
            if matches!(slot, Value::Struct(_)) {
                return Err(conflict());
            }
            *slot = value;
        }
        None => {
            cursor.entry(leaf.name.to_string()).or_insert(value);
        }
    }
    Ok(())
}

/// Slot `index` of the array stored under the segment's name, growing the
/// array with [`Value::Empty`] as needed.
fn array_slot<'t>(
    cursor: &'t mut IndexMap<String, Value>,
    segment: &Segment<'_>,
    index: usize,
    line: usize,
    key: &str,
) -> Result<&'t mut Value, ParseError> {
    if index > MAX_INDEX {
        return Err(ParseError::IndexOutOfRange {
            line,
            key: key.to_string(),
            index,
        });
    }
    let array = cursor
        .entry(segment.name.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    let Value::Array(items) = array else {
        return Err(ParseError::Conflict {
            line,
            key: key.to_string(),
        });
    };
    if items.len() <= index {
        items.resize(index + 1, Value::Empty);
    }
    Ok(&mut items[index])
}

fn expected_kind(tag: Option<TypeTag>) -> &'static str {
    match tag {
        Some(TypeTag::Integer) => "integer",
        Some(TypeTag::Float) => "float",
        Some(TypeTag::Bool) => "boolean",
        Some(TypeTag::Text) => "text",
        Some(TypeTag::Struct) | None => "value",
    }
}

/// Reads a literal according to the declared tag.
///
/// Untagged (and `s`-tagged) leaves try, in order: hexadecimal integer,
/// decimal integer, float, and finally keep the raw literal as text.
fn coerce(tag: Option<TypeTag>, literal: &[u8]) -> Option<Value> {
    match tag {
        Some(TypeTag::Bool) => parse_integer(literal).map(|v| Value::Bool(v != 0)),
        Some(TypeTag::Text) => Some(Value::Text(unquote(literal).to_vec())),
        Some(TypeTag::Integer) => parse_integer(literal).map(Value::Integer),
        Some(TypeTag::Float) => parse_float(literal).map(Value::Float),
        Some(TypeTag::Struct) | None => Some(
            parse_integer(literal)
                .map(Value::Integer)
                .or_else(|| parse_float(literal).map(Value::Float))
                .unwrap_or_else(|| Value::Text(literal.to_vec())),
        ),
    }
}

/// `0x`-prefixed hexadecimal or plain decimal. Hexadecimal literals are
/// bit patterns, so values above `i64::MAX` wrap.
fn parse_integer(literal: &[u8]) -> Option<i64> {
    let text = std::str::from_utf8(literal).ok()?;
    match text.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16).ok().map(|v| v as i64),
        None => text.parse::<i64>().ok(),
    }
}

fn parse_float(literal: &[u8]) -> Option<f64> {
    std::str::from_utf8(literal).ok()?.parse::<f64>().ok()
}

/// Strips every surrounding double quote: scanners write `""1H""`.
fn unquote(literal: &[u8]) -> &[u8] {
    let start = literal.iter().position(|&b| b != b'"');
    let end = literal.iter().rposition(|&b| b != b'"');
    match (start, end) {
        (Some(start), Some(end)) => &literal[start..=end],
        _ => &[],
    }
}
