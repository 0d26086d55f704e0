use coalesce::{
    MemoryCollection, Record, RecordCollection, Value,
    collection::PropertyFilter,
    log::MemoryLog,
    merge::{FnMergeHandler, MergeHandler, MergeParameters, PropertyMergeHandler},
};

use crate::helpers::{RecordingHandler, collect_all, cycled_items, ids, item};

#[test]
fn test_select_over_merged_view() {
    let source = MemoryCollection::from_records(cycled_items(12, &["a", "b", "c"]));
    let handler = RecordingHandler::default();
    let merged = handler
        .merge_instances(&source, &MergeParameters::new("groups"), &MemoryLog::new())
        .expect("merge builds");

    let only_b = merged.select(PropertyFilter::new("key", "b"));
    let records = collect_all(&only_b);
    assert_eq!(records.len(), 1);
    assert_eq!(ids(&records), vec![1, 4, 7, 10]);

    // The filter sees every merged group but leaves the index alone
    assert_eq!(handler.merge_calls(), 3);
    assert_eq!(merged.size(), Some(3));
    assert_eq!(only_b.size(), None);
}

#[test]
fn test_merge_over_filtered_source() {
    let source = MemoryCollection::from_records(cycled_items(12, &["a", "b", "c"]));
    let without_c = source.select(|r: &Record| r.first("key") != Some(&Value::from("c")));
    let handler = RecordingHandler::default();
    let merged = handler
        .merge_instances(&without_c, &MergeParameters::new("ab"), &MemoryLog::new())
        .expect("merge builds");

    assert_eq!(merged.size(), Some(2));
    collect_all(&merged);
    assert_eq!(
        handler.sorted_groups(),
        vec![
            (Value::from("a"), vec![0, 3, 6, 9]),
            (Value::from("b"), vec![1, 4, 7, 10]),
        ]
    );
}

#[test]
fn test_merged_view_cannot_index_its_own_output() {
    let source = MemoryCollection::from_records(cycled_items(6, &["a", "b"]));
    let first = RecordingHandler::default();
    let merged = first
        .merge_instances(&source, &MergeParameters::new("first"), &MemoryLog::new())
        .expect("merge builds");

    // Merged records have no reference in the source, so a second merge
    // directly over the view fails while scanning
    let second = RecordingHandler::default();
    let err = second
        .merge_instances(&merged, &MergeParameters::new("second"), &MemoryLog::new())
        .err()
        .expect("merged output is not addressable");
    assert!(err.is_contract_violation());
}

#[test]
fn test_remerge_after_materializing() {
    let source = MemoryCollection::from_records([
        item(1, "x").with_property("zone", "north"),
        item(2, "x").with_property("zone", "north"),
        item(3, "y").with_property("zone", "north"),
        item(4, "z").with_property("zone", "south"),
    ]);
    let by_key = PropertyMergeHandler::new();
    let params = MergeParameters::new("by-key")
        .with_parameter("property", "key")
        .with_parameter("additional_property", "id")
        .with_parameter("additional_property", "zone");
    let merged = by_key
        .merge_instances(&source, &params, &MemoryLog::new())
        .expect("merge builds");

    // Materialize the first stage into a new arena, then merge by zone
    let stage: MemoryCollection = collect_all(&merged).into_iter().collect();
    let by_zone = FnMergeHandler::new(
        |_, _| Ok(()),
        |record: &Record, _: &()| Ok(record.first("zone").cloned()),
        |records: Vec<Record>, zone: &Option<Value>, _: &()| {
            let mut out = Record::new("Zone");
            if let Some(zone) = zone {
                out.push_value("zone", zone.clone());
            }
            for record in &records {
                for key in record.values("key") {
                    out.push_value("keys", key.clone());
                }
            }
            Ok(out)
        },
    );
    let zones = by_zone
        .merge_instances(&stage, &MergeParameters::new("by-zone"), &MemoryLog::new())
        .expect("merge builds");

    let records = collect_all(&zones);
    assert_eq!(records.len(), 2);
    let north = records
        .iter()
        .find(|r| r.first("zone") == Some(&Value::from("north")))
        .expect("north zone");
    assert_eq!(
        north.values("keys"),
        &[Value::from("x"), Value::from("y")]
    );
}

#[test]
fn test_reused_member_record_is_detached_from_source() {
    let source = MemoryCollection::from_records([item(1, "x"), item(2, "x"), item(3, "y")]);
    // Returns the first member itself, origin included, with a member count
    let tally = FnMergeHandler::new(
        |_, _| Ok(()),
        |record: &Record, _: &()| Ok(record.first("key").cloned()),
        |records: Vec<Record>, _: &Option<Value>, _: &()| {
            let count = records.len() as i64;
            let mut first = records
                .into_iter()
                .next()
                .expect("groups are never empty");
            first.push_value("count", count);
            Ok(first)
        },
    );
    let merged = tally
        .merge_instances(&source, &MergeParameters::new("tally"), &MemoryLog::new())
        .expect("merge builds");

    let records = collect_all(&merged);
    let counts: Vec<_> = records.iter().map(|r| r.values("count").to_vec()).collect();
    assert_eq!(counts, vec![vec![Value::from(2)], vec![Value::from(1)]]);

    let only_x = merged.select(PropertyFilter::new("key", "x"));
    for record in &records {
        assert!(record.origin().is_none());
        assert!(merged.reference(record).unwrap_err().is_contract_violation());
        assert!(only_x.reference(record).unwrap_err().is_contract_violation());
    }

    // Merging the view again must not fall through to the stale source records
    let second = RecordingHandler::default();
    let err = second
        .merge_instances(&merged, &MergeParameters::new("again"), &MemoryLog::new())
        .err()
        .expect("merged output is not addressable");
    assert!(err.is_contract_violation());
    assert_eq!(second.merge_calls(), 0);
}
