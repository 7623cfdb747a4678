use crate::view_model::{AppViewModel, Notice};
use crate::{visible_set, QuerySpec, Record, RecordId, RecordStore, StatusTally};

const DEFAULT_RECORD_LABEL: &str = "record";
const DEFAULT_CHART_TITLE: &str = "Status";

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    store: RecordStore,
    query: QuerySpec,
    pending_delete: Option<RecordId>,
    notices: Vec<Notice>,
    loading: bool,
    record_label: String,
    chart_title: String,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_labels(DEFAULT_RECORD_LABEL, DEFAULT_CHART_TITLE)
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `record_label` is used in notices ("maintenance record"), `chart_title`
    /// names the status chart.
    pub fn with_labels(record_label: impl Into<String>, chart_title: impl Into<String>) -> Self {
        Self {
            store: RecordStore::new(),
            query: QuerySpec::new(),
            pending_delete: None,
            notices: Vec::new(),
            loading: false,
            record_label: record_label.into(),
            chart_title: chart_title.into(),
            dirty: false,
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            rows: self.visible_rows(),
            total: self.store.len(),
            chart: self.tally().chart(self.chart_title.clone()),
            query: self.query.clone(),
            pending_delete: self.pending_delete.clone(),
            notice: self.notices.last().cloned(),
            loading: self.loading,
            dirty: self.dirty,
        }
    }

    pub fn visible_rows(&self) -> Vec<Record> {
        visible_set(self.store.records(), &self.query)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn tally(&self) -> StatusTally {
        StatusTally::from_records(self.store.records())
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn query(&self) -> &QuerySpec {
        &self.query
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn record_label(&self) -> &str {
        &self.record_label
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn store_mut(&mut self) -> &mut RecordStore {
        &mut self.store
    }

    pub(crate) fn set_query(&mut self, query: QuerySpec) {
        if self.query != query {
            self.query = query;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        self.mark_dirty();
    }

    pub(crate) fn pending_delete(&self) -> Option<&RecordId> {
        self.pending_delete.as_ref()
    }

    pub(crate) fn set_pending_delete(&mut self, id: Option<RecordId>) {
        self.pending_delete = id;
        self.mark_dirty();
    }

    pub(crate) fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
        self.mark_dirty();
    }

    pub(crate) fn clear_notices(&mut self) {
        if !self.notices.is_empty() {
            self.notices.clear();
            self.mark_dirty();
        }
    }
}
