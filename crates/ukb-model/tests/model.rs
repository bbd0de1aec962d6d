use ukb_model::{ColumnMatch, ExtractOptions, MappingRecord, MatchStrategy};

#[test]
fn partial_toml_keeps_defaults() {
    let options: ExtractOptions = toml::from_str(
        r#"
        data_root = "/mnt/ukb/raw"
        chunk_rows = 1000
        delimiters = [",", "\t"]
        "#,
    )
    .expect("parse options");

    assert_eq!(options.chunk_rows, 1000);
    assert_eq!(options.delimiters, vec![',', '\t']);
    assert_eq!(options.output_id_column, "participant.eid");
    assert_eq!(options.id_columns, vec!["participant.eid", "eid"]);
    assert!(options.validate().is_ok());
}

#[test]
fn unknown_option_is_rejected() {
    let result: Result<ExtractOptions, _> = toml::from_str("chunk_size = 10");
    assert!(result.is_err());
}

#[test]
fn mapping_record_uses_legacy_column_names() {
    let record = MappingRecord {
        path: "Physical > BodySize".to_string(),
        file_path: "Physical/BodySize.csv".to_string(),
        field_id: "21".to_string(),
        field: "Height".to_string(),
    };
    let json = serde_json::to_value(&record).expect("serialize record");
    assert_eq!(json["fieldid"], "21");
    assert_eq!(json["file_path"], "Physical/BodySize.csv");
}

#[test]
fn column_match_sort_key_defaults_missing_parts() {
    let plain = ColumnMatch::unchanged("Height");
    assert_eq!(plain.sort_key(), (0, 0));
    assert_eq!(plain.canonical_name, "Height");

    let repeated = ColumnMatch {
        physical_column: "participant.p21_i2_a1".to_string(),
        canonical_name: "Height_i2_a1".to_string(),
        instance: Some(2),
        repeat: Some(1),
    };
    assert_eq!(repeated.sort_key(), (2, 1));
}

#[test]
fn strategies_are_ordered_by_priority() {
    assert!(MatchStrategy::RepeatedMeasurement < MatchStrategy::Prefixed);
    assert!(MatchStrategy::Prefixed < MatchStrategy::DisplayName);
    assert!(MatchStrategy::DisplayName < MatchStrategy::Fallback);
}
