use std::collections::BTreeMap;

use crate::{Record, Status};

/// Per-status counts over the full collection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusTally {
    counts: BTreeMap<Status, usize>,
}

impl StatusTally {
    /// Scans every record; records without a recognized status are not counted.
    pub fn from_records(records: &[Record]) -> Self {
        let mut counts: BTreeMap<Status, usize> = Status::ALL.iter().map(|s| (*s, 0)).collect();
        for status in records.iter().filter_map(Record::status) {
            *counts.entry(status).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn count(&self, status: Status) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// `(bucket key, count)` in chart order.
    pub fn entries(&self) -> Vec<(&'static str, usize)> {
        Status::ALL
            .iter()
            .map(|status| (status.key(), self.count(*status)))
            .collect()
    }

    pub fn chart(&self, title: impl Into<String>) -> ChartData {
        ChartData {
            title: title.into(),
            labels: Status::ALL.iter().map(|s| s.label().to_string()).collect(),
            counts: Status::ALL.iter().map(|s| self.count(*s)).collect(),
        }
    }
}

/// Ordered labels with a parallel count list, ready for a pie chart.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChartData {
    pub title: String,
    pub labels: Vec<String>,
    pub counts: Vec<usize>,
}

impl ChartData {
    pub fn slices(&self) -> impl Iterator<Item = (&str, usize)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.counts.iter().copied())
    }
}
