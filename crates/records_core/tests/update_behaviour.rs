use std::sync::Once;

use pretty_assertions::assert_eq;
use records_core::{
    update, AppState, Effect, FieldValue, Msg, MutationFailure, NoticeKind, Record, RecordId,
    RecordPatch, SortDirection, SortSpec, Status, StatusFilter,
};
use serde_json::json;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(console_logging::initialize_for_tests);
}

fn record(value: serde_json::Value) -> Record {
    Record::from_json(&value).expect("valid record")
}

fn loaded_state() -> AppState {
    let collection = vec![
        record(json!({"_id": "1", "status": "completed", "eqname": "Drill", "quantity": 3})),
        record(json!({"_id": "2", "status": "in progress", "eqname": "Saw", "quantity": 1})),
        record(json!({"_id": "3", "status": "in progress", "eqname": "Pump", "quantity": 2})),
    ];
    let state = AppState::with_labels("maintenance record", "Maintenance Status");
    let (state, _) = update(state, Msg::RefreshRequested);
    let (mut state, _) = update(state, Msg::CollectionLoaded(collection));
    state.consume_dirty();
    state
}

fn visible_ids(state: &AppState) -> Vec<String> {
    state
        .view()
        .rows
        .iter()
        .map(|r| r.id().to_string())
        .collect()
}

#[test]
fn refresh_emits_fetch_and_tracks_loading() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::RefreshRequested);
    assert_eq!(effects, vec![Effect::FetchCollection]);
    assert!(state.view().loading);

    let (state, effects) = update(state, Msg::CollectionLoadFailed);
    assert!(effects.is_empty());
    assert!(!state.view().loading);
    assert_eq!(state.view().total, 0);
}

#[test]
fn failed_refresh_keeps_previous_collection() {
    init_logging();
    let state = loaded_state();
    let before = state.store().clone();

    let (state, _) = update(state, Msg::RefreshRequested);
    let (state, _) = update(state, Msg::CollectionLoadFailed);

    assert_eq!(state.store(), &before);
    assert_eq!(state.view().total, 3);
}

#[test]
fn query_messages_recompute_visible_rows() {
    init_logging();
    let state = loaded_state();

    let (mut state, _) = update(
        state,
        Msg::StatusFilterChanged(StatusFilter::Only(Status::InProgress)),
    );
    assert!(state.consume_dirty());
    assert_eq!(visible_ids(&state), vec!["2", "3"]);

    let (state, _) = update(state, Msg::ColumnClicked("quantity".to_string()));
    assert_eq!(visible_ids(&state), vec!["2", "3"]);
    let (state, _) = update(state, Msg::ColumnClicked("quantity".to_string()));
    assert_eq!(visible_ids(&state), vec!["3", "2"]);
    let (state, _) = update(state, Msg::ColumnClicked("quantity".to_string()));
    assert_eq!(state.query().sort, SortSpec::unsorted());

    let (state, _) = update(state, Msg::SearchChanged("PUMP".to_string()));
    assert_eq!(visible_ids(&state), vec!["3"]);

    // The chart always reflects the whole collection.
    assert_eq!(state.view().chart.counts, vec![2, 1]);
    assert_eq!(state.view().total, 3);
}

#[test]
fn repeated_query_is_not_dirty() {
    init_logging();
    let state = loaded_state();
    let (mut state, _) = update(state, Msg::SearchChanged("saw".to_string()));
    assert!(state.consume_dirty());
    let (mut state, _) = update(state, Msg::SearchChanged("saw".to_string()));
    assert!(!state.consume_dirty());
}

#[test]
fn delete_requires_confirmation() {
    init_logging();
    let state = loaded_state();

    let (state, effects) = update(state, Msg::DeleteClicked(RecordId::from("2")));
    assert!(effects.is_empty());
    assert_eq!(state.view().pending_delete, Some(RecordId::from("2")));

    let (state, effects) = update(state, Msg::DeleteCancelled);
    assert!(effects.is_empty());
    assert_eq!(state.view().pending_delete, None);
    assert_eq!(state.view().total, 3);

    let (state, _) = update(state, Msg::DeleteClicked(RecordId::from("2")));
    let (state, effects) = update(state, Msg::DeleteConfirmed);
    assert_eq!(
        effects,
        vec![Effect::DeleteRecord {
            id: RecordId::from("2")
        }]
    );
    // Nothing is removed until the service confirms.
    assert_eq!(state.view().total, 3);
    assert_eq!(state.view().pending_delete, None);
}

#[test]
fn confirm_without_pending_delete_is_ignored() {
    init_logging();
    let (_, effects) = update(loaded_state(), Msg::DeleteConfirmed);
    assert!(effects.is_empty());

    let (state, _) = update(loaded_state(), Msg::DeleteClicked(RecordId::from("missing")));
    assert_eq!(state.view().pending_delete, None);
}

#[test]
fn successful_delete_removes_exactly_one_record() {
    init_logging();
    let state = loaded_state();
    let survivors: Vec<Record> = state
        .store()
        .records()
        .iter()
        .filter(|r| r.id().as_str() != "2")
        .cloned()
        .collect();

    let (state, effects) = update(
        state,
        Msg::DeleteFinished {
            id: RecordId::from("2"),
            result: Ok(()),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.store().records(), survivors.as_slice());

    let notice = state.view().notice.expect("notice");
    assert_eq!(notice.kind, NoticeKind::Success);
    assert_eq!(notice.text, "Maintenance record deleted successfully!");
}

#[test]
fn not_found_delete_surfaces_server_message() {
    init_logging();
    let state = loaded_state();
    let before = state.store().clone();

    let (state, _) = update(
        state,
        Msg::DeleteFinished {
            id: RecordId::from("2"),
            result: Err(MutationFailure {
                server_message: Some("not found".to_string()),
                detail: "http status 404".to_string(),
            }),
        },
    );

    assert_eq!(state.store(), &before);
    let notice = state.view().notice.expect("notice");
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.text, "not found");
}

#[test]
fn delete_failure_without_message_uses_generic_text() {
    init_logging();
    let (state, _) = update(
        loaded_state(),
        Msg::DeleteFinished {
            id: RecordId::from("1"),
            result: Err(MutationFailure {
                server_message: None,
                detail: "network error".to_string(),
            }),
        },
    );
    assert_eq!(
        state.view().notice.map(|n| n.text),
        Some("There was an error deleting the maintenance record.".to_string())
    );
}

#[test]
fn concurrent_deletes_of_same_id_are_tolerated() {
    init_logging();
    let state = loaded_state();
    let (state, first) = {
        let (state, _) = update(state, Msg::DeleteClicked(RecordId::from("3")));
        update(state, Msg::DeleteConfirmed)
    };
    let (state, second) = {
        let (state, _) = update(state, Msg::DeleteClicked(RecordId::from("3")));
        update(state, Msg::DeleteConfirmed)
    };
    assert_eq!(first, second);

    let (state, _) = update(
        state,
        Msg::DeleteFinished {
            id: RecordId::from("3"),
            result: Ok(()),
        },
    );
    let (state, _) = update(
        state,
        Msg::DeleteFinished {
            id: RecordId::from("3"),
            result: Err(MutationFailure {
                server_message: Some("not found".to_string()),
                detail: "http status 404".to_string(),
            }),
        },
    );

    assert_eq!(state.view().total, 2);
    assert_eq!(state.notices().len(), 2);
    assert_eq!(state.notices()[1].text, "not found");

    let (state, _) = update(state, Msg::NoticeDismissed);
    assert_eq!(state.view().notice, None);
}

#[test]
fn update_flow_merges_patch_after_confirmation() {
    init_logging();
    let state = loaded_state();
    let patch = RecordPatch::new().with("status", FieldValue::text("Completed"));

    let (state, effects) = update(state, Msg::EditClicked(RecordId::from("2")));
    assert_eq!(
        effects,
        vec![Effect::NavigateToEdit {
            id: RecordId::from("2")
        }]
    );

    let (state, effects) = update(
        state,
        Msg::UpdateSubmitted {
            id: RecordId::from("2"),
            patch: patch.clone(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::UpdateRecord {
            id: RecordId::from("2"),
            patch: patch.clone()
        }]
    );
    assert_eq!(state.view().chart.counts, vec![2, 1]);

    let (state, _) = update(
        state,
        Msg::UpdateFinished {
            id: RecordId::from("2"),
            patch,
            result: Ok(()),
        },
    );
    assert_eq!(state.view().chart.counts, vec![1, 2]);
    assert_eq!(
        state.store().get(&RecordId::from("2")).and_then(|r| r.status()),
        Some(Status::Completed)
    );
}

#[test]
fn export_hands_off_visible_rows_only() {
    init_logging();
    let state = loaded_state();
    let (state, _) = update(
        state,
        Msg::SortRequested(SortSpec::by("eqname", SortDirection::Descending)),
    );
    let (state, _) = update(
        state,
        Msg::StatusFilterChanged(StatusFilter::Only(Status::InProgress)),
    );

    let (_, effects) = update(state, Msg::ExportClicked);
    let rows = match effects.as_slice() {
        [Effect::GenerateReport { rows }] => rows.clone(),
        other => panic!("unexpected effects: {other:?}"),
    };
    let ids: Vec<_> = rows.iter().map(|r| r.id().to_string()).collect();
    assert_eq!(ids, vec!["2", "3"]);
}

#[test]
fn reload_clears_confirmation_for_vanished_record() {
    init_logging();
    let state = loaded_state();
    let (state, _) = update(state, Msg::DeleteClicked(RecordId::from("1")));
    let (state, _) = update(
        state,
        Msg::CollectionLoaded(vec![record(json!({"_id": "9", "status": "completed"}))]),
    );
    assert_eq!(state.view().pending_delete, None);
    assert_eq!(state.view().total, 1);
}
