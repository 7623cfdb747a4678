use crate::filter::filter_records;
use crate::sort::sort_records;
use crate::{QuerySpec, Record};

/// `sort(filter(collection, query), query.sort)`.
///
/// Pure and cheap enough to call on every keystroke; debounce belongs to the
/// input layer.
pub fn visible_set<'a>(collection: &'a [Record], query: &QuerySpec) -> Vec<&'a Record> {
    let filtered = filter_records(collection, &query.text, query.status);
    sort_records(filtered, &query.sort)
}
