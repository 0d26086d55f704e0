use coalesce::{
    Error, MemoryCollection, Record, RecordCollection, Value,
    log::{LogLevel, MemoryLog},
    merge::{MergeError, MergeHandler, MergeParameters, PropertyMergeHandler},
};

use crate::helpers::collect_all;

fn road(name: &str, lane: i64) -> Record {
    Record::new("Road")
        .with_property("name", name)
        .with_property("lane", lane)
}

/// The handler error wrapped by a configuration failure.
fn configuration_cause(err: &Error) -> &MergeError {
    match err {
        Error::Merge(MergeError::Configuration { source, .. }) => match source.as_ref() {
            Error::Merge(cause) => cause,
            other => panic!("Expected a merge error cause, got {other:?}"),
        },
        other => panic!("Expected a configuration failure, got {other:?}"),
    }
}

// ==========================
// CONFIGURATION
// ==========================

#[test]
fn test_missing_key_property_fails_before_indexing() {
    let source = MemoryCollection::from_records([road("A1", 1)]);
    let log = MemoryLog::new();
    let err = PropertyMergeHandler::new()
        .merge_instances(&source, &MergeParameters::new("roads"), &log)
        .err()
        .expect("key property is required");

    assert!(err.is_configuration_error());
    assert_eq!(configuration_cause(&err).parameter(), Some("property"));
    assert_eq!(source.open_cursors(), 0);
}

#[test]
fn test_blank_key_properties_are_ignored() {
    let log = MemoryLog::new();
    let params = MergeParameters::new("roads")
        .with_parameter("property", "  ")
        .with_parameter("property", "");
    let err = PropertyMergeHandler::new()
        .configure(&params, &log)
        .expect_err("only blank key properties");

    assert!(matches!(
        err,
        Error::Merge(MergeError::MissingParameter { .. })
    ));
    assert_eq!(log.messages(LogLevel::Warn).len(), 2);
}

#[test]
fn test_repeated_key_property_is_used_once() {
    let log = MemoryLog::new();
    let params = MergeParameters::new("roads")
        .with_parameter("property", "name")
        .with_parameter("property", " name ")
        .with_parameter("auto_detect", "false");
    let config = PropertyMergeHandler::new()
        .configure(&params, &log)
        .expect("valid configuration");

    assert_eq!(config.key_properties(), ["name"]);
    let warnings = log.messages(LogLevel::Warn);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("repeated"));
}

#[test]
fn test_auto_detect_defaults_with_info_message() {
    let log = MemoryLog::new();
    let params = MergeParameters::new("roads").with_parameter("property", "name");
    let config = PropertyMergeHandler::new()
        .configure(&params, &log)
        .expect("valid configuration");

    assert!(!config.auto_detect());
    let infos = log.messages(LogLevel::Info);
    assert_eq!(infos.len(), 1);
    assert!(infos[0].contains("auto_detect"));
    assert!(!log.has_errors());
}

#[test]
fn test_auto_detect_accepts_any_case() {
    let params = MergeParameters::new("roads")
        .with_parameter("property", "name")
        .with_parameter("auto_detect", "TRUE");
    let config = PropertyMergeHandler::new()
        .configure(&params, &MemoryLog::new())
        .expect("valid configuration");
    assert!(config.auto_detect());
}

#[test]
fn test_malformed_auto_detect_is_rejected() {
    let source = MemoryCollection::from_records([road("A1", 1)]);
    let params = MergeParameters::new("roads")
        .with_parameter("property", "name")
        .with_parameter("auto_detect", "sometimes");
    let err = PropertyMergeHandler::new()
        .merge_instances(&source, &params, &MemoryLog::new())
        .err()
        .expect("auto_detect must be a boolean");

    let cause = configuration_cause(&err);
    assert!(matches!(cause, MergeError::InvalidParameter { .. }));
    assert_eq!(cause.parameter(), Some("auto_detect"));
}

#[test]
fn test_additional_property_overlapping_key_is_dropped() {
    let log = MemoryLog::new();
    let params = MergeParameters::new("roads")
        .with_parameter("property", "name")
        .with_parameter("additional_property", "name")
        .with_parameter("additional_property", "lane");
    let config = PropertyMergeHandler::new()
        .configure(&params, &log)
        .expect("valid configuration");

    assert_eq!(config.additional_properties(), ["lane"]);
    assert!(
        log.messages(LogLevel::Warn)
            .iter()
            .any(|message| message.contains("already a key property"))
    );
}

// ==========================
// MERGING
// ==========================

#[test]
fn test_merge_keeps_key_and_unions_additional_values() {
    let source = MemoryCollection::from_records([
        road("A1", 2),
        road("B7", 1),
        road("A1", 1).with_property("surface", "asphalt"),
        road("A1", 2),
    ]);
    let params = MergeParameters::new("roads")
        .with_parameter("property", "name")
        .with_parameter("additional_property", "lane");
    let handler = PropertyMergeHandler::new();
    let merged = handler
        .merge_instances(&source, &params, &MemoryLog::new())
        .expect("merge builds");

    let records = collect_all(&merged);
    assert_eq!(records.len(), 2);

    let a1 = &records[0];
    assert_eq!(a1.type_name(), "Road");
    assert_eq!(a1.values("name"), &[Value::from("A1")]);
    assert_eq!(a1.values("lane"), &[Value::from(2), Value::from(1)]);
    // Not configured, so not carried over
    assert!(!a1.has_property("surface"));

    assert_eq!(records[1].values("lane"), &[Value::from(1)]);
}

#[test]
fn test_auto_detect_combines_every_non_key_property() {
    let source = MemoryCollection::from_records([
        road("A1", 1).with_property("surface", "asphalt"),
        road("A1", 2).with_property("surface", "concrete"),
        road("A1", 2).with_property("speed", 120),
    ]);
    let params = MergeParameters::new("roads")
        .with_parameter("property", "name")
        .with_parameter("auto_detect", "true");
    let handler = PropertyMergeHandler::new();
    let merged = handler
        .merge_instances(&source, &params, &MemoryLog::new())
        .expect("merge builds");

    let records = collect_all(&merged);
    assert_eq!(records.len(), 1);
    let road = &records[0];
    assert_eq!(road.values("name"), &[Value::from("A1")]);
    assert_eq!(road.values("lane"), &[Value::from(1), Value::from(2)]);
    assert_eq!(
        road.values("surface"),
        &[Value::from("asphalt"), Value::from("concrete")]
    );
    assert_eq!(road.values("speed"), &[Value::from(120)]);
}

#[test]
fn test_composite_key_follows_property_order() {
    let source = MemoryCollection::from_records([
        road("A1", 1).with_property("country", "UK"),
        road("A1", 2).with_property("country", "FR"),
        road("A1", 3).with_property("country", "UK"),
    ]);
    let params = MergeParameters::new("roads")
        .with_parameter("property", "country")
        .with_parameter("property", "name")
        .with_parameter("additional_property", "lane");
    let handler = PropertyMergeHandler::new();
    let merged = handler
        .merge_instances(&source, &params, &MemoryLog::new())
        .expect("merge builds");

    assert_eq!(merged.config().key_properties(), ["country", "name"]);
    let first_key = merged.index().keys().next().expect("at least one group");
    assert_eq!(
        first_key.values(),
        &[vec![Value::from("UK")], vec![Value::from("A1")]]
    );

    let records = collect_all(&merged);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].values("lane"), &[Value::from(1), Value::from(3)]);
}

#[test]
fn test_records_without_key_property_group_together() {
    let source = MemoryCollection::from_records([
        Record::new("Road").with_property("lane", 1),
        road("A1", 1),
        Record::new("Road").with_property("lane", 4),
    ]);
    let params = MergeParameters::new("roads")
        .with_parameter("property", "name")
        .with_parameter("additional_property", "lane");
    let handler = PropertyMergeHandler::new();
    let merged = handler
        .merge_instances(&source, &params, &MemoryLog::new())
        .expect("merge builds");

    let records = collect_all(&merged);
    assert_eq!(records.len(), 2);
    let unnamed = &records[0];
    assert!(!unnamed.has_property("name"));
    assert_eq!(unnamed.values("lane"), &[Value::from(1), Value::from(4)]);
}

#[test]
fn test_direct_merge_of_empty_group_is_rejected() {
    let handler = PropertyMergeHandler::new();
    let params = MergeParameters::new("roads").with_parameter("property", "name");
    let config = handler
        .configure(&params, &MemoryLog::new())
        .expect("valid configuration");
    let key = handler
        .merge_key(&road("A1", 1), &config)
        .expect("key extracted");

    let err = handler
        .merge(Vec::new(), &key, &config)
        .expect_err("no members to merge");
    assert!(err.is_contract_violation());
}
