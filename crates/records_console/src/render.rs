use std::fmt::Write as _;

use records_core::{AppViewModel, ChartData, Notice, QuerySpec, SortDirection, StatusFilter};
use records_engine::report::ReportColumn;

const MAX_CELL: usize = 28;
const BAR_WIDTH: usize = 30;

/// Renders the visible rows as a plain text table, id first.
pub fn render_table(view: &AppViewModel, columns: &[ReportColumn]) -> String {
    let mut header = vec!["ID".to_string()];
    header.extend(
        columns
            .iter()
            .map(|column| header_label(column, &view.query)),
    );
    let body: Vec<Vec<String>> = view
        .rows
        .iter()
        .map(|record| {
            let mut cells = vec![record.id().to_string()];
            cells.extend(columns.iter().map(|column| clip(&column.cell(record))));
            cells
        })
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|index| {
            body.iter()
                .map(|row| row[index].chars().count())
                .chain(std::iter::once(header[index].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_row(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &body {
        push_row(&mut out, row, &widths);
    }
    let _ = writeln!(
        out,
        "{} of {} shown{}",
        view.rows.len(),
        view.total,
        describe_query(&view.query)
    );
    out
}

pub fn render_chart(chart: &ChartData) -> String {
    let total: usize = chart.counts.iter().sum();
    let label_width = chart.labels.iter().map(|l| l.len()).max().unwrap_or(0);
    let mut out = format!("{}\n", chart.title);
    for (label, count) in chart.slices() {
        let bar = if total == 0 {
            0
        } else {
            (count * BAR_WIDTH).div_ceil(total)
        };
        let _ = writeln!(
            out,
            "  {label:<label_width$}  {count:>4}  {}",
            "#".repeat(bar)
        );
    }
    out
}

pub fn render_notice(notice: &Notice) -> String {
    format!("{}: {}", notice.title(), notice.text)
}

fn header_label(column: &ReportColumn, query: &QuerySpec) -> String {
    match query.sort.active() {
        Some((field, SortDirection::Ascending)) if field == column.field => {
            format!("{} ^", column.title)
        }
        Some((field, SortDirection::Descending)) if field == column.field => {
            format!("{} v", column.title)
        }
        _ => column.title.clone(),
    }
}

fn describe_query(query: &QuerySpec) -> String {
    let mut parts = Vec::new();
    if !query.text.is_empty() {
        parts.push(format!("search \"{}\"", query.text));
    }
    if let StatusFilter::Only(status) = query.status {
        parts.push(format!("status {}", status.label()));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

fn clip(value: &str) -> String {
    if value.chars().count() <= MAX_CELL {
        return value.to_string();
    }
    let kept: String = value.chars().take(MAX_CELL - 3).collect();
    format!("{kept}...")
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}
