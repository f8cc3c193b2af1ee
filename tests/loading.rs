use anvil::{
    decode, load_hierarchical_json, load_hierarchical_json_with, Error, FlattenConfig, Scalar,
    Tabularizer,
};

#[test]
fn test_api_payload_to_table() {
    let payload = r#"{
        "data": [
            {"id": 1, "attributes": {"title": "First", "tags": ["a"]}},
            {"id": 2, "attributes": {"title": "Second"}}
        ],
        "meta": {"page": 1}
    }"#;

    // A single object is one record, so everything lands in one row
    let table = load_hierarchical_json(payload).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(
        table.columns(),
        &[
            "data.0.id",
            "data.0.attributes.title",
            "data.0.attributes.tags.0",
            "data.1.id",
            "data.1.attributes.title",
            "meta.page",
        ]
    );
}

#[test]
fn test_array_payload_rows() {
    let table = load_hierarchical_json(
        br#"[{"x": 1, "nested": {"flag": false}}, {"y": "two"}, 3]"#,
    )
    .unwrap();

    assert_eq!(table.columns(), &["x", "nested.flag", "y", ""]);
    assert_eq!(table.len(), 3);

    let last = table.row(2).unwrap();
    assert_eq!(last.get(""), Some(&Some(Scalar::from(3i64))));
    assert_eq!(last.get("x"), Some(&None));
}

#[test]
fn test_config_is_checked_before_decoding() {
    let err = load_hierarchical_json_with("not json", FlattenConfig::default().with_separator(""))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn test_depth_limit_through_loader() {
    let err = load_hierarchical_json_with(
        r#"{"a": {"b": {"c": 1}}}"#,
        FlattenConfig::default().with_max_depth(2),
    )
    .unwrap_err();
    assert!(matches!(err, Error::DepthLimitExceeded { max_depth: 2, .. }));
}

#[test]
fn test_ndjson_batch() {
    let records = decode::parse_ndjson("{\"a\": 1}\n{\"a\": 2, \"b\": [true]}\n").unwrap();
    let table = Tabularizer::default().tabularize_records(records).unwrap();

    assert_eq!(table.columns(), &["a", "b.0"]);
    assert_eq!(table.row(0).unwrap().get("b.0"), Some(&None));
    assert_eq!(
        table.row(1).unwrap().get("b.0"),
        Some(&Some(Scalar::from(true)))
    );
}
