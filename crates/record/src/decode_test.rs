use super::*;

fn decode(line: &str) -> Result<Record, ParseError> {
    Decoder::new().decode(line)
}

#[test]
fn test_decode_string() {
    let record = decode(r#"{"key":"hello","value":"world","type":"string"}"#).unwrap();
    assert_eq!(
        record,
        Record::String {
            key: "hello".to_string(),
            expiry: None,
            value: "world".to_string(),
        }
    );
}

#[test]
fn test_decode_string_with_expiry() {
    let record =
        decode(r#"{"key":"k","value":"v","type":"string","expiry":1700000000000}"#).unwrap();
    assert_eq!(record.expiry(), Some(1_700_000_000_000));
}

#[test]
fn test_decode_hash() {
    let record = decode(r#"{"key":"h","value":{"a":"1","b":"2"},"type":"hash"}"#).unwrap();
    match record {
        Record::Hash { key, fields, .. } => {
            assert_eq!(key, "h");
            assert_eq!(fields.len(), 2);
            assert_eq!(fields["a"], "1");
            assert_eq!(fields["b"], "2");
        }
        other => panic!("expected hash, got {other:?}"),
    }
}

#[test]
fn test_decode_list_keeps_order_and_duplicates() {
    let record = decode(r#"{"key":"l","value":["x","y","x"],"type":"list"}"#).unwrap();
    match record {
        Record::List { elements, .. } => assert_eq!(elements, vec!["x", "y", "x"]),
        other => panic!("expected list, got {other:?}"),
    }
}

#[test]
fn test_decode_set_deduplicates() {
    let record = decode(r#"{"key":"s","value":["a","b","a"],"type":"set"}"#).unwrap();
    match record {
        Record::Set { members, .. } => {
            assert_eq!(members.len(), 2);
            assert!(members.contains("a"));
            assert!(members.contains("b"));
        }
        other => panic!("expected set, got {other:?}"),
    }
}

#[test]
fn test_decode_sorted_set() {
    let record =
        decode(r#"{"key":"board","value":{"alice":1.5,"bob":2},"type":"sortedset"}"#).unwrap();
    match record {
        Record::SortedSet { members, .. } => {
            assert_eq!(members.len(), 2);
            assert_eq!(members["alice"], 1.5);
            assert_eq!(members["bob"], 2.0);
        }
        other => panic!("expected sorted set, got {other:?}"),
    }
}

#[test]
fn test_sorted_set_can_be_disabled() {
    let decoder = Decoder::new().sorted_sets(false);
    let err = decoder
        .decode(r#"{"key":"board","value":{"alice":1.5},"type":"sortedset"}"#)
        .unwrap_err();
    assert_eq!(
        err,
        ParseError::UnsupportedType {
            tag: "sortedset".to_string()
        }
    );
    assert_eq!(err.reason(), Reason::DataTypeNotSupported);
}

#[test]
fn test_malformed_json_is_invalid() {
    for line in ["", "{", "not json at all", r#"{"key":"k""#] {
        assert_eq!(decode(line).unwrap_err(), ParseError::InvalidJson, "line: {line}");
    }
}

#[test]
fn test_missing_or_nonstring_type_is_invalid() {
    assert_eq!(
        decode(r#"{"key":"k","value":"v"}"#).unwrap_err(),
        ParseError::InvalidJson
    );
    assert_eq!(
        decode(r#"{"key":"k","value":"v","type":7}"#).unwrap_err(),
        ParseError::InvalidJson
    );
}

#[test]
fn test_unknown_tag_keeps_raw_tag() {
    let err = decode(r#"{"key":"k","value":"v","type":"stream"}"#).unwrap_err();
    assert_eq!(
        err,
        ParseError::UnsupportedType {
            tag: "stream".to_string()
        }
    );
    assert_eq!(err.reason(), Reason::DataTypeNotSupported);
}

#[test]
fn test_shape_mismatch_is_invalid() {
    // hash tag with a string value
    assert_eq!(
        decode(r#"{"key":"h","value":"oops","type":"hash"}"#).unwrap_err(),
        ParseError::InvalidJson
    );
    // list tag with an object value
    assert_eq!(
        decode(r#"{"key":"l","value":{"a":"1"},"type":"list"}"#).unwrap_err(),
        ParseError::InvalidJson
    );
    // string tag with a numeric value
    assert_eq!(
        decode(r#"{"key":"s","value":3,"type":"string"}"#).unwrap_err(),
        ParseError::InvalidJson
    );
}

#[test]
fn test_missing_key_is_invalid() {
    assert_eq!(
        decode(r#"{"value":"v","type":"string"}"#).unwrap_err(),
        ParseError::InvalidJson
    );
}

#[test]
fn test_fractional_expiry_is_invalid() {
    assert_eq!(
        decode(r#"{"key":"k","value":"v","type":"string","expiry":12.5}"#).unwrap_err(),
        ParseError::InvalidJson
    );
}

#[test]
fn test_unknown_fields_are_ignored() {
    let record =
        decode(r#"{"key":"k","value":"v","type":"string","database":0,"rdb_version":9}"#)
            .unwrap();
    assert_eq!(record.key(), "k");
}
