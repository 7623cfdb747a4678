use crate::{Record, StatusFilter};

/// Keeps records that pass the status filter and contain `text`
/// (case-insensitive) in any field value. Collection order is preserved.
pub fn filter_records<'a>(
    collection: &'a [Record],
    text: &str,
    status: StatusFilter,
) -> Vec<&'a Record> {
    let needle = text.to_lowercase();
    collection
        .iter()
        .filter(|record| status.matches(record.status()))
        .filter(|record| needle.is_empty() || matches_text(record, &needle))
        .collect()
}

/// `needle` must already be lower-cased.
pub fn matches_text(record: &Record, needle: &str) -> bool {
    record.id().as_str().to_lowercase().contains(needle)
        || record
            .fields()
            .any(|(_, value)| value.to_search_text().to_lowercase().contains(needle))
}
