use crate::{Record, RecordId, RecordPatch, SortSpec, StatusFilter};

/// Why a remote write did not go through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationFailure {
    /// `message` from the service's error body, shown verbatim when present.
    pub server_message: Option<String>,
    /// Transport-level description for logs.
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User asked for a (re)load of the collection.
    RefreshRequested,
    /// Engine delivered a fresh collection.
    CollectionLoaded(Vec<Record>),
    /// Engine failed to load; the previous collection stays.
    CollectionLoadFailed,
    /// User edited the free-text search box.
    SearchChanged(String),
    StatusFilterChanged(StatusFilter),
    /// Explicit sort request (field and direction chosen by the caller).
    SortRequested(SortSpec),
    /// User clicked a column header; advances the tri-state cycle.
    ColumnClicked(String),
    /// User clicked Delete on a row; opens the confirmation gate.
    DeleteClicked(RecordId),
    DeleteConfirmed,
    DeleteCancelled,
    /// Engine finished a delete request.
    DeleteFinished {
        id: RecordId,
        result: Result<(), MutationFailure>,
    },
    EditClicked(RecordId),
    /// Edit screen submitted a patch for a record.
    UpdateSubmitted { id: RecordId, patch: RecordPatch },
    /// Engine finished an update request.
    UpdateFinished {
        id: RecordId,
        patch: RecordPatch,
        result: Result<(), MutationFailure>,
    },
    ExportClicked,
    /// Report export finished with the written path or an error description.
    ReportFinished(Result<String, String>),
    NoticeDismissed,
}
