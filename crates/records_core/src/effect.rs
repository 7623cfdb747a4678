use crate::{Record, RecordId, RecordPatch};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Load the full collection from the record service.
    FetchCollection,
    DeleteRecord { id: RecordId },
    UpdateRecord { id: RecordId, patch: RecordPatch },
    /// Hand off to the (out of core) edit screen.
    NavigateToEdit { id: RecordId },
    /// Render the given visible rows into a report document.
    GenerateReport { rows: Vec<Record> },
}
