//! Records core: record model, query pipeline, and the pure console state machine.
mod effect;
mod filter;
mod msg;
mod query;
mod record;
mod sort;
mod state;
mod store;
mod tally;
mod update;
mod view_model;
mod visible;

pub use effect::Effect;
pub use filter::{filter_records, matches_text};
pub use msg::{Msg, MutationFailure};
pub use query::{QuerySpec, SortDirection, SortSpec, StatusFilter};
pub use record::{
    parse_date, FieldValue, Record, RecordError, RecordId, RecordPatch, Status, ID_FIELDS,
    STATUS_FIELD,
};
pub use sort::{compare_values, sort_records};
pub use state::AppState;
pub use store::RecordStore;
pub use tally::{ChartData, StatusTally};
pub use update::update;
pub use view_model::{AppViewModel, Notice, NoticeKind};
pub use visible::visible_set;
