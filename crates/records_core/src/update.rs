use crate::view_model::Notice;
use crate::{AppState, Effect, MutationFailure, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::RefreshRequested => {
            state.set_loading(true);
            vec![Effect::FetchCollection]
        }
        Msg::CollectionLoaded(records) => {
            state.store_mut().replace(records);
            let stale = state
                .pending_delete()
                .is_some_and(|id| state.store().get(id).is_none());
            if stale {
                state.set_pending_delete(None);
            }
            state.set_loading(false);
            Vec::new()
        }
        Msg::CollectionLoadFailed => {
            state.set_loading(false);
            Vec::new()
        }
        Msg::SearchChanged(text) => {
            let query = state.query().with_text(text);
            state.set_query(query);
            Vec::new()
        }
        Msg::StatusFilterChanged(filter) => {
            let query = state.query().with_status(filter);
            state.set_query(query);
            Vec::new()
        }
        Msg::SortRequested(sort) => {
            let query = state.query().with_sort(sort);
            state.set_query(query);
            Vec::new()
        }
        Msg::ColumnClicked(field) => {
            let query = state.query().cycle_sort(&field);
            state.set_query(query);
            Vec::new()
        }
        Msg::DeleteClicked(id) => {
            if state.store().get(&id).is_some() {
                state.set_pending_delete(Some(id));
            }
            Vec::new()
        }
        Msg::DeleteConfirmed => match state.pending_delete().cloned() {
            Some(id) => {
                state.set_pending_delete(None);
                vec![Effect::DeleteRecord { id }]
            }
            None => Vec::new(),
        },
        Msg::DeleteCancelled => {
            if state.pending_delete().is_some() {
                state.set_pending_delete(None);
            }
            Vec::new()
        }
        Msg::DeleteFinished { id, result } => {
            let notice = match result {
                Ok(()) => {
                    // A concurrent delete may already have removed it.
                    state.store_mut().apply_deletion(&id);
                    Notice::success(format!(
                        "{} deleted successfully!",
                        capitalize(state.record_label())
                    ))
                }
                Err(failure) => failure_notice(&failure, "deleting", state.record_label()),
            };
            state.push_notice(notice);
            Vec::new()
        }
        Msg::EditClicked(id) => {
            if state.store().get(&id).is_some() {
                vec![Effect::NavigateToEdit { id }]
            } else {
                Vec::new()
            }
        }
        Msg::UpdateSubmitted { id, patch } => {
            if patch.is_empty() {
                Vec::new()
            } else {
                vec![Effect::UpdateRecord { id, patch }]
            }
        }
        Msg::UpdateFinished { id, patch, result } => {
            let notice = match result {
                Ok(()) => {
                    state.store_mut().apply_update(&id, &patch);
                    Notice::success(format!(
                        "{} updated successfully!",
                        capitalize(state.record_label())
                    ))
                }
                Err(failure) => failure_notice(&failure, "updating", state.record_label()),
            };
            state.push_notice(notice);
            Vec::new()
        }
        Msg::ExportClicked => vec![Effect::GenerateReport {
            rows: state.visible_rows(),
        }],
        Msg::ReportFinished(result) => {
            let notice = match result {
                Ok(path) => Notice::success(format!("Report saved to {path}")),
                Err(reason) => Notice::error(format!(
                    "There was an error generating the report: {reason}"
                )),
            };
            state.push_notice(notice);
            Vec::new()
        }
        Msg::NoticeDismissed => {
            state.clear_notices();
            Vec::new()
        }
    };

    (state, effects)
}

fn failure_notice(failure: &MutationFailure, action: &str, label: &str) -> Notice {
    match failure.server_message.as_deref() {
        Some(message) if !message.is_empty() => Notice::error(message),
        _ => Notice::error(format!("There was an error {action} the {label}.")),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
