//! Test-only `SV10` writer.

#![allow(dead_code)]

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use mrmeta_value::{MetaData, Value};

#[derive(Default)]
pub struct CsaBuilder {
    count: u32,
    body: Vec<u8>,
}

impl CsaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an element whose first `vm` items are values; any extra
    /// items are written as trailing padding items.
    pub fn element(mut self, name: &str, vr: &str, vm: u32, items: &[&[u8]]) -> Self {
        let mut raw_name = [0u8; 64];
        raw_name[..name.len()].copy_from_slice(name.as_bytes());
        self.body.extend_from_slice(&raw_name);
        self.body.extend_from_slice(&vm.to_le_bytes());
        self.body.extend_from_slice(vr.as_bytes());
        self.body.extend_from_slice(&[0, 0]);
        self.body.extend_from_slice(&6u32.to_le_bytes());
        self.body.extend_from_slice(&(items.len() as u32).to_le_bytes());
        self.body.extend_from_slice(&77u32.to_le_bytes());
        for content in items {
            let length = content.len() as u32;
            for field in [length, length, 77, length] {
                self.body.extend_from_slice(&field.to_le_bytes());
            }
            self.body.extend_from_slice(content);
            self.body
                .extend(std::iter::repeat(0u8).take((4 - content.len() % 4) % 4));
        }
        self.count += 1;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(16 + self.body.len());
        out.extend_from_slice(b"SV10");
        out.extend_from_slice(&[4, 3, 2, 1]);
        out.extend_from_slice(&self.count.to_le_bytes());
        out.extend_from_slice(&77u32.to_le_bytes());
        out.extend_from_slice(&self.body);
        out
    }
}

pub fn base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

pub fn ascconv(lines: &str) -> Vec<u8> {
    format!("### ASCCONV BEGIN ###\n{lines}\n### ASCCONV END ###\n").into_bytes()
}

/// Series header container whose `MrPhoenixProtocol` embeds `lines`.
pub fn series_header(lines: &str) -> Vec<u8> {
    let mut protocol = b"<XProtocol> { }\n".to_vec();
    protocol.extend_from_slice(&ascconv(lines));
    protocol.push(0);
    CsaBuilder::new()
        .element("UsedPatientWeight", "IS", 1, &[b"70\0"])
        .element("MrPhoenixProtocol", "UN", 1, &[&protocol])
        .build()
}

/// JSON-loader shaped container: creator at `00290010`, base64 blob at
/// `00291020`.
pub fn meta_with_protocol(lines: &str) -> MetaData {
    let mut meta = MetaData::new();
    meta.insert(
        "00290010",
        Value::Array(vec![Value::from("SIEMENS CSA HEADER")]),
    );
    meta.insert(
        "00291020",
        Value::Array(vec![Value::from(base64(&series_header(lines)).as_str())]),
    );
    meta
}
