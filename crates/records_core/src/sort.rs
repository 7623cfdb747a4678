use std::cmp::Ordering;

use crate::{FieldValue, Record, SortDirection, SortSpec};

/// Stable sort of `rows` by the requested field. Ties keep their incoming
/// order in both directions; an inactive sort returns `rows` untouched.
pub fn sort_records<'a>(mut rows: Vec<&'a Record>, sort: &SortSpec) -> Vec<&'a Record> {
    let Some((field, direction)) = sort.active() else {
        return rows;
    };
    rows.sort_by(|a, b| {
        let ordering = compare_values(a.field(field), b.field(field));
        match direction {
            SortDirection::Descending => ordering.reverse(),
            SortDirection::Ascending | SortDirection::Unsorted => ordering,
        }
    });
    rows
}

/// Numbers compare numerically, dates chronologically, text by code point
/// (case-sensitive). Mixed kinds order as missing < null < bool < number <
/// date < text.
pub fn compare_values(a: Option<&FieldValue>, b: Option<&FieldValue>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a, b) {
            (FieldValue::Bool(x), FieldValue::Bool(y)) => x.cmp(y),
            (FieldValue::Number(x), FieldValue::Number(y)) => x.total_cmp(y),
            (FieldValue::Date { at: x, .. }, FieldValue::Date { at: y, .. }) => x.cmp(y),
            (FieldValue::Text(x), FieldValue::Text(y)) => x.cmp(y),
            _ => kind_rank(a).cmp(&kind_rank(b)),
        },
    }
}

fn kind_rank(value: &FieldValue) -> u8 {
    match value {
        FieldValue::Null => 0,
        FieldValue::Bool(_) => 1,
        FieldValue::Number(_) => 2,
        FieldValue::Date { .. } => 3,
        FieldValue::Text(_) => 4,
    }
}
