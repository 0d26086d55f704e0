use coalesce::{
    MemoryCollection, Record, RecordCollection, RecordCursor, Value,
    collection::PropertyFilter,
};

use crate::helpers::{collect_all, cycled_items, ids};

fn id_of(record: &Record) -> i64 {
    record.first("id").and_then(Value::as_int).unwrap_or(-1)
}

#[test]
fn test_select_with_closure() {
    let source = MemoryCollection::from_records(cycled_items(10, &["a", "b"]));
    let even = source.select(|r: &Record| id_of(r) % 2 == 0);

    let records = collect_all(&even);
    assert_eq!(ids(&records), vec![0, 2, 4, 6, 8]);
    assert_eq!(even.size(), None);
    assert!(!even.is_empty().unwrap());
}

#[test]
fn test_select_with_property_filter() {
    let source = MemoryCollection::from_records(cycled_items(9, &["a", "b", "c"]));
    let only_c = source.select(PropertyFilter::new("key", "c"));

    assert_eq!(ids(&collect_all(&only_c)), vec![2, 5, 8]);
}

#[test]
fn test_empty_selection_reports_empty_and_closes_probe() {
    let source = MemoryCollection::from_records(cycled_items(4, &["a"]));
    let none = source.select(PropertyFilter::new("key", "zzz"));

    assert!(none.is_empty().unwrap());
    assert!(collect_all(&none).is_empty());
    assert_eq!(source.open_cursors(), 0);
}

#[test]
fn test_filtered_view_delegates_references() {
    let source = MemoryCollection::from_records(cycled_items(3, &["a", "b"]));
    let view = source.select(PropertyFilter::new("key", "b"));

    let record = collect_all(&view).pop().expect("one record matches");
    let reference = view.reference(&record).expect("record came from source");
    assert_eq!(reference, source.reference(&record).unwrap());
    assert_eq!(view.resolve(&reference).unwrap(), Some(record));
    assert_eq!(view.name(), source.name());
}

#[test]
fn test_filters_nest() {
    let source = MemoryCollection::from_records(cycled_items(12, &["a", "b"]));
    let a = source.select(PropertyFilter::new("key", "a"));
    let a_small = a.select(|r: &Record| id_of(r) < 6);

    assert_eq!(ids(&collect_all(&a_small)), vec![0, 2, 4]);
}

#[test]
fn test_filtered_cursor_close_releases_source_cursor() {
    let source = MemoryCollection::from_records(cycled_items(5, &["a"]));
    let view = source.select(PropertyFilter::new("key", "a"));

    let mut cursor = view.cursor().expect("cursor opens");
    assert_eq!(source.open_cursors(), 1);
    cursor.next();
    cursor.close();
    assert_eq!(source.open_cursors(), 0);
    assert!(cursor.next().is_none());
}

#[test]
fn test_filtered_cursor_remove_is_rejected() {
    let source = MemoryCollection::from_records(cycled_items(2, &["a"]));
    let view = source.select(PropertyFilter::new("key", "a"));

    let mut cursor = view.cursor().expect("cursor opens");
    cursor.next();
    assert!(cursor.remove().unwrap_err().is_contract_violation());
}
