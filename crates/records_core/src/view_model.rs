use crate::{ChartData, QuerySpec, Record, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// User-facing notification, like a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            NoticeKind::Success => "Success",
            NoticeKind::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    /// Visible rows, filtered and sorted.
    pub rows: Vec<Record>,
    /// Size of the full collection.
    pub total: usize,
    pub chart: ChartData,
    pub query: QuerySpec,
    pub pending_delete: Option<RecordId>,
    pub notice: Option<Notice>,
    pub loading: bool,
    pub dirty: bool,
}
