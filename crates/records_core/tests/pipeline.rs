use pretty_assertions::assert_eq;
use records_core::{
    filter_records, sort_records, visible_set, FieldValue, QuerySpec, Record, RecordId,
    SortDirection, SortSpec, Status, StatusFilter, StatusTally,
};
use serde_json::json;

fn record(value: serde_json::Value) -> Record {
    Record::from_json(&value).expect("valid record")
}

fn ids(rows: &[&Record]) -> Vec<String> {
    rows.iter().map(|r| r.id().to_string()).collect()
}

fn maintenance() -> Vec<Record> {
    vec![
        record(json!({
            "_id": "a1", "eqname": "Drill", "quantity": 4, "status": "Completed",
            "reffereddate": "2024-03-05T00:00:00.000Z", "referredlocation": "Kandy"
        })),
        record(json!({
            "_id": "b2", "eqname": "saw", "quantity": 10, "status": "In Progress",
            "reffereddate": "2024-01-20T00:00:00.000Z", "referredlocation": "Colombo"
        })),
        record(json!({
            "_id": "c3", "eqname": "Tractor", "quantity": 2, "status": "in progress",
            "reffereddate": "2024-02-11T00:00:00.000Z", "referredlocation": "Galle"
        })),
        record(json!({
            "_id": "d4", "eqname": "Pump", "quantity": 10, "status": "awaiting parts",
            "reffereddate": "2023-12-30", "referredlocation": "Kandy"
        })),
    ]
}

#[test]
fn search_scenario_matches_equipment_name() {
    let collection = vec![
        record(json!({"id": 1, "status": "completed", "eqname": "Drill"})),
        record(json!({"id": 2, "status": "in progress", "eqname": "Saw"})),
    ];

    let visible = visible_set(&collection, &QuerySpec::new().with_text("saw"));
    assert_eq!(ids(&visible), vec!["2"]);

    let tally = StatusTally::from_records(&collection);
    assert_eq!(tally.entries(), vec![("in progress", 1), ("completed", 1)]);
}

#[test]
fn search_is_case_insensitive_across_all_field_kinds() {
    let collection = maintenance();

    let by_text = filter_records(&collection, "KANDY", StatusFilter::All);
    assert_eq!(ids(&by_text), vec!["a1", "d4"]);

    let by_number = filter_records(&collection, "10", StatusFilter::All);
    assert_eq!(ids(&by_number), vec!["b2", "d4"]);

    let by_date = filter_records(&collection, "2024-02", StatusFilter::All);
    assert_eq!(ids(&by_date), vec!["c3"]);

    let by_id = filter_records(&collection, "B2", StatusFilter::All);
    assert_eq!(ids(&by_id), vec!["b2"]);

    let nothing = filter_records(&collection, "combine", StatusFilter::All);
    assert!(nothing.is_empty());
}

#[test]
fn search_matches_dates_as_stored() {
    let collection = vec![
        record(json!({"_id": "e5", "receiveddate": "2024-03-05T23:30:00+05:30"})),
        record(json!({"_id": "f6", "receiveddate": "2024-03-06T10:00:00Z"})),
    ];

    assert_eq!(ids(&filter_records(&collection, "+05:30", StatusFilter::All)), vec!["e5"]);
    assert_eq!(ids(&filter_records(&collection, "23:30", StatusFilter::All)), vec!["e5"]);
    assert_eq!(ids(&filter_records(&collection, "10:00:00z", StatusFilter::All)), vec!["f6"]);
    // The UTC instant of e5 is 18:00, which was never stored.
    assert!(filter_records(&collection, "18:00", StatusFilter::All).is_empty());

    // Ordering still goes by instant: 23:30+05:30 is before 10:00Z next day.
    let rows: Vec<&Record> = collection.iter().collect();
    let sorted = sort_records(rows, &SortSpec::by("receiveddate", SortDirection::Descending));
    assert_eq!(ids(&sorted), vec!["f6", "e5"]);
    assert_eq!(
        collection[0].to_json()["receiveddate"],
        json!("2024-03-05T23:30:00+05:30")
    );
}

#[test]
fn status_labels_match_only_exact_spellings() {
    let collection = vec![
        record(json!({"_id": "1", "status": "in-progress"})),
        record(json!({"_id": "2", "status": "In_Progress"})),
        record(json!({"_id": "3", "status": "inprogress"})),
        record(json!({"_id": "4", "status": "c o m p l e t e d"})),
    ];

    let tally = StatusTally::from_records(&collection);
    assert_eq!(tally.count(Status::InProgress), 0);
    assert_eq!(tally.count(Status::Completed), 0);

    let in_progress = filter_records(&collection, "", StatusFilter::Only(Status::InProgress));
    assert!(in_progress.is_empty());
    let completed = filter_records(&collection, "", StatusFilter::Only(Status::Completed));
    assert!(completed.is_empty());
}

#[test]
fn status_filter_uses_normalized_status() {
    let collection = maintenance();
    let in_progress = filter_records(&collection, "", StatusFilter::Only(Status::InProgress));
    assert_eq!(ids(&in_progress), vec!["b2", "c3"]);

    let combined = filter_records(&collection, "tractor", StatusFilter::Only(Status::InProgress));
    assert_eq!(ids(&combined), vec!["c3"]);

    let completed = filter_records(&collection, "tractor", StatusFilter::Only(Status::Completed));
    assert!(completed.is_empty());
}

#[test]
fn empty_collection_filters_to_empty() {
    let query = QuerySpec::new()
        .with_text("anything")
        .with_status(StatusFilter::Only(Status::Completed));
    assert!(visible_set(&[], &query).is_empty());
}

#[test]
fn numeric_sort_is_numeric_and_stable() {
    let collection = maintenance();
    let rows: Vec<&Record> = collection.iter().collect();

    let ascending = sort_records(rows.clone(), &SortSpec::by("quantity", SortDirection::Ascending));
    assert_eq!(ids(&ascending), vec!["c3", "a1", "b2", "d4"]);

    // Equal quantities keep collection order in both directions.
    let descending =
        sort_records(rows, &SortSpec::by("quantity", SortDirection::Descending));
    assert_eq!(ids(&descending), vec!["b2", "d4", "a1", "c3"]);
}

#[test]
fn date_sort_is_chronological() {
    let collection = maintenance();
    let rows: Vec<&Record> = collection.iter().collect();
    let sorted = sort_records(rows, &SortSpec::by("reffereddate", SortDirection::Ascending));
    assert_eq!(ids(&sorted), vec!["d4", "b2", "c3", "a1"]);
}

#[test]
fn text_sort_is_case_sensitive() {
    let collection = maintenance();
    let rows: Vec<&Record> = collection.iter().collect();
    let sorted = sort_records(rows, &SortSpec::by("eqname", SortDirection::Ascending));
    // Upper-case letters order before lower-case ones.
    assert_eq!(ids(&sorted), vec!["a1", "d4", "c3", "b2"]);
}

#[test]
fn missing_field_sorts_first_ascending() {
    let collection = vec![
        record(json!({"_id": "x", "quantity": 3})),
        record(json!({"_id": "y"})),
        record(json!({"_id": "z", "quantity": 1})),
    ];
    let rows: Vec<&Record> = collection.iter().collect();
    let sorted = sort_records(rows, &SortSpec::by("quantity", SortDirection::Ascending));
    assert_eq!(ids(&sorted), vec!["y", "z", "x"]);
}

#[test]
fn unsorted_spec_is_pass_through() {
    let collection = maintenance();
    let rows: Vec<&Record> = collection.iter().collect();
    let spec = SortSpec {
        field: Some("quantity".to_string()),
        direction: SortDirection::Unsorted,
    };
    assert_eq!(ids(&sort_records(rows, &spec)), vec!["a1", "b2", "c3", "d4"]);
}

#[test]
fn column_click_cycles_tri_state() {
    let query = QuerySpec::new();
    let first = query.cycle_sort("eqname");
    assert_eq!(first.sort, SortSpec::by("eqname", SortDirection::Ascending));
    let second = first.cycle_sort("eqname");
    assert_eq!(second.sort.direction, SortDirection::Descending);
    let third = second.cycle_sort("eqname");
    assert_eq!(third.sort, SortSpec::unsorted());

    let switched = second.cycle_sort("quantity");
    assert_eq!(switched.sort, SortSpec::by("quantity", SortDirection::Ascending));
}

#[test]
fn tally_ignores_query_and_unrecognized_labels() {
    let collection = maintenance();
    let tally = StatusTally::from_records(&collection);
    assert_eq!(tally.count(Status::InProgress), 2);
    assert_eq!(tally.count(Status::Completed), 1);
    assert_eq!(tally.total(), 3);

    let chart = tally.chart("Maintenance Status");
    assert_eq!(chart.labels, vec!["In Progress", "Completed"]);
    assert_eq!(chart.counts, vec![2, 1]);
}

#[test]
fn ingestion_converts_field_kinds_once() {
    let rec = record(json!({
        "_id": "r1",
        "quantity": 5,
        "ratio": 2.5,
        "receiveddate": "2024-04-01T08:30:00Z",
        "status": " COMPLETED ",
        "tags": ["a", "b"],
        "note": null
    }));
    assert_eq!(rec.id(), &RecordId::from("r1"));
    assert_eq!(rec.status(), Some(Status::Completed));
    assert_eq!(rec.field("quantity").map(FieldValue::to_search_text).as_deref(), Some("5"));
    assert_eq!(rec.field("ratio").map(FieldValue::to_search_text).as_deref(), Some("2.5"));
    assert_eq!(
        rec.field("receiveddate").map(FieldValue::to_search_text).as_deref(),
        Some("2024-04-01T08:30:00Z")
    );
    assert_eq!(
        rec.field("tags"),
        Some(&FieldValue::text(r#"["a","b"]"#))
    );
    assert_eq!(rec.field("note"), Some(&FieldValue::Null));
}

#[test]
fn ingestion_rejects_records_without_id() {
    let err = Record::from_json(&json!({"eqname": "Drill"})).unwrap_err();
    assert_eq!(err, records_core::RecordError::MissingId);
    assert!(Record::from_json(&json!("just text")).is_err());
}
