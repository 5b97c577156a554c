mod common;

use common::{base64, meta_with_protocol, series_header, CsaBuilder};
use mrmeta_csa::{CsaOptions, DecodeError, ParseError, PrivateGroupAddress};
use mrmeta_path::{resolve, AccessError, Accessor, ResolveError, Resolver};
use mrmeta_value::{MetaData, Value};
use proptest::prelude::*;
use serde_json::json;

const PROTOCOL: &str = "alTR[0] = 28000\n\
                        sTXSPEC.asNucleusInfo[0].tNucleus = \"\"1H\"\"\n\
                        sTXSPEC.asNucleusInfo[0].lFrequency = 123252547";

fn attempt_errors(error: &ResolveError) -> Vec<(&'static str, AccessError)> {
    error
        .attempts()
        .iter()
        .map(|a| (a.accessor, a.error.clone()))
        .collect()
}

#[test]
fn phoenix_protocol_path() {
    let meta = meta_with_protocol(PROTOCOL);
    assert_eq!(
        resolve(&meta, "00291020.0.MrPhoenixProtocol.0.alTR.0"),
        Ok(Value::Integer(28000))
    );
    assert_eq!(
        resolve(&meta, "00291020.0.MrPhoenixProtocol.0.alTR"),
        Ok(Value::Array(vec![Value::Integer(28000)]))
    );
    assert_eq!(
        resolve(&meta, "00291020.0.MrPhoenixProtocol.0.sTXSPEC.asNucleusInfo.0.tNucleus"),
        Ok(Value::from("1H"))
    );
}

#[test]
fn csa_elements_resolve_to_their_value_sequence() {
    let meta = meta_with_protocol(PROTOCOL);
    assert_eq!(
        resolve(&meta, "00291020.0.UsedPatientWeight"),
        Ok(Value::Array(vec![Value::Integer(70)]))
    );
    assert_eq!(
        resolve(&meta, "00291020.0.UsedPatientWeight.0"),
        Ok(Value::Integer(70))
    );

    let protocol = resolve(&meta, "00291020.0.MrPhoenixProtocol").unwrap();
    let items = protocol.as_array().unwrap();
    assert_eq!(items.len(), 1);
    let text = items[0].as_bytes().unwrap();
    assert!(text.starts_with(b"<XProtocol>"));
    assert!(text.ends_with(b"\0"));
}

#[test]
fn plain_keyword_paths() {
    let meta = MetaData::from_json(&json!({"EchoTime": [[2.3], [6.9]]})).unwrap();
    assert_eq!(resolve(&meta, "EchoTime.1.0"), Ok(Value::Float(6.9)));
    assert_eq!(
        resolve(&meta, "EchoTime"),
        Ok(Value::Array(vec![
            Value::Array(vec![Value::Float(2.3)]),
            Value::Array(vec![Value::Float(6.9)]),
        ]))
    );
}

#[test]
fn dicom_json_model_input() {
    let blob = base64(&series_header(PROTOCOL));
    let meta = MetaData::from_json(&json!({
        "00290010": {"vr": "LO", "Value": ["SIEMENS CSA HEADER"]},
        "00291020": {"vr": "OB", "InlineBinary": blob},
        "00180081": {"vr": "DS", "Value": [4.92]},
    }))
    .unwrap();

    assert_eq!(
        resolve(&meta, "00291020.0.MrPhoenixProtocol.0.alTR.0"),
        Ok(Value::Integer(28000))
    );
    assert_eq!(resolve(&meta, "00180081.0"), Ok(Value::Float(4.92)));
}

#[test]
fn tag_keys_inside_sequence_items_ignore_case() {
    let meta = MetaData::from_json(&json!({
        "00089215": {"vr": "SQ", "Value": [{"0018005A": {"vr": "DS", "Value": [2.5]}}]},
    }))
    .unwrap();
    assert_eq!(resolve(&meta, "00089215.0.0018005a.0"), Ok(Value::Float(2.5)));
    assert_eq!(resolve(&meta, "00089215.0.0018005A.0"), Ok(Value::Float(2.5)));
}

#[test]
fn tag_segments_ignore_case() {
    let mut meta = MetaData::new();
    meta.insert("002900A0", Value::Array(vec![Value::from("SIEMENS CSA HEADER")]));
    meta.insert(
        "0029A020",
        Value::Array(vec![Value::Text(series_header("lA = 5"))]),
    );
    assert_eq!(
        resolve(&meta, "0029a020.0.MrPhoenixProtocol.0.lA"),
        Ok(Value::Integer(5))
    );
    assert_eq!(
        resolve(&meta, "0029A020.0.MrPhoenixProtocol.0.lA"),
        Ok(Value::Integer(5))
    );
}

#[test]
fn relocated_private_block() {
    let mut meta = MetaData::new();
    meta.insert("00290010", Value::Array(vec![Value::from("SIEMENS MEDCOM HEADER")]));
    meta.insert("00290011", Value::Array(vec![Value::from("SIEMENS CSA HEADER")]));
    let blob = Value::Text(series_header("lA = 1"));
    meta.insert("00291020", Value::Array(vec![blob.clone()]));
    meta.insert("00291120", Value::Array(vec![blob]));

    assert_eq!(
        resolve(&meta, "00291120.0.MrPhoenixProtocol.0.lA"),
        Ok(Value::Integer(1))
    );

    let error = resolve(&meta, "00291020.0.MrPhoenixProtocol.0.lA").unwrap_err();
    assert_eq!(error.path(), "00291020.0.MrPhoenixProtocol");
    assert_eq!(
        attempt_errors(&error),
        vec![
            ("csa", AccessError::NotApplicable("private creator does not match")),
            ("protocol", AccessError::NotApplicable("parent is not MrPhoenixProtocol")),
        ]
    );
}

#[test]
fn missing_creator_follows_the_fallback_policy() {
    let mut meta = MetaData::new();
    meta.insert(
        "00291020",
        Value::Array(vec![Value::Text(series_header("lA = 1"))]),
    );
    let query = "00291020.0.MrPhoenixProtocol.0.lA";

    assert_eq!(resolve(&meta, query), Ok(Value::Integer(1)));

    let strict = Resolver::new(CsaOptions::strict());
    let error = strict.resolve(&meta, query).unwrap_err();
    assert_eq!(
        attempt_errors(&error)[0],
        ("csa", AccessError::NotApplicable("private creator is missing"))
    );

    let elsewhere = Resolver::new(
        CsaOptions::default().with_fallback(Some(PrivateGroupAddress::new(0x0029, 0x11))),
    );
    assert!(elsewhere.resolve(&meta, query).is_err());
}

#[test]
fn accessor_failures_are_collected() {
    let meta = meta_with_protocol(PROTOCOL);
    let error = resolve(&meta, "00291020.0.MrPhoenixProtocol.0.alMissing.0").unwrap_err();
    assert_eq!(error.path(), "00291020.0.MrPhoenixProtocol.0.alMissing");
    assert_eq!(
        attempt_errors(&error),
        vec![
            ("csa", AccessError::NotApplicable("parent is not a private element of the CSA group")),
            ("protocol", AccessError::MissingEntry("alMissing".to_string())),
        ]
    );

    let error = resolve(&meta, "00291020.0.NoSuchElement").unwrap_err();
    assert_eq!(
        attempt_errors(&error)[0],
        ("csa", AccessError::MissingEntry("NoSuchElement".to_string()))
    );
}

#[test]
fn decode_and_parse_failures_surface_as_attempts() {
    let mut corrupt = MetaData::new();
    corrupt.insert("00290010", Value::Array(vec![Value::from("SIEMENS CSA HEADER")]));
    corrupt.insert("00291020", Value::Array(vec![Value::from("not a container")]));
    let error = resolve(&corrupt, "00291020.0.MrPhoenixProtocol").unwrap_err();
    assert!(matches!(
        attempt_errors(&error)[0],
        ("csa", AccessError::Decode(DecodeError::BadMagic { .. }))
    ));

    let mut blockless = MetaData::new();
    blockless.insert(
        "00291020",
        Value::Array(vec![Value::Text(
            CsaBuilder::new()
                .element("MrPhoenixProtocol", "UN", 1, &[b"<XProtocol> { }\0"])
                .build(),
        )]),
    );
    let error = resolve(&blockless, "00291020.0.MrPhoenixProtocol.0.alTR").unwrap_err();
    assert_eq!(
        attempt_errors(&error)[1],
        ("protocol", AccessError::Parse(ParseError::NoProtocolBlock))
    );
}

#[test]
fn index_and_key_failures_have_no_attempts() {
    let meta = meta_with_protocol(PROTOCOL);
    for (query, prefix) in [
        ("00291021", "00291021"),
        ("00291020.1", "00291020.1"),
        ("00291020.first", "00291020.first"),
        ("00291020.0.MrPhoenixProtocol.0.alTR.3", "00291020.0.MrPhoenixProtocol.0.alTR.3"),
    ] {
        let error = resolve(&meta, query).unwrap_err();
        assert_eq!(error.path(), prefix, "{query}");
        assert!(error.attempts().is_empty(), "{query}");
    }
}

#[test]
fn accessors_run_in_chain_order() {
    let meta = MetaData::from_json(&json!({"Scalar": ["x"]})).unwrap();

    let ordered = Resolver::default().with_accessors([
        Accessor::new("first", |_| Ok(Value::Integer(1))),
        Accessor::new("second", |_| Ok(Value::Integer(2))),
    ]);
    assert_eq!(ordered.resolve(&meta, "Scalar.0.anything"), Ok(Value::Integer(1)));

    let fallback = Resolver::default().with_accessors([
        Accessor::new("broken", |cx| {
            Err(AccessError::MissingEntry(cx.segment.to_string()))
        }),
        Accessor::new("echo", |cx| Ok(Value::from(cx.segment))),
    ]);
    assert_eq!(fallback.resolve(&meta, "Scalar.0.word"), Ok(Value::from("word")));
}

#[test]
fn concurrent_resolution_over_shared_meta_data() {
    let meta = meta_with_protocol(PROTOCOL);
    let resolver = Resolver::default();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| resolver.resolve(&meta, "00291020.0.MrPhoenixProtocol.0.alTR.0"))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), Ok(Value::Integer(28000)));
        }
    });
}

proptest! {
    #[test]
    fn sequence_indices_resolve_only_in_range(
        values in proptest::collection::vec(any::<i64>(), 0..16),
        index in 0usize..24,
    ) {
        let mut meta = MetaData::new();
        meta.insert("Values", Value::Array(values.iter().copied().map(Value::Integer).collect()));
        let query = format!("Values.{index}");

        match values.get(index) {
            Some(&expected) => prop_assert_eq!(resolve(&meta, &query), Ok(Value::Integer(expected))),
            None => {
                let error = resolve(&meta, &query).unwrap_err();
                prop_assert_eq!(error.path(), query.as_str());
            }
        }
    }
}
