use records_core::Record;

use crate::report::template::ReportTemplate;
use crate::LogoImage;

// Geometry is in millimetres from the top-left corner of an A4 portrait page.
pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 10.0;
const LETTERHEAD_TOP: f32 = 10.0;
const LETTERHEAD_STEP: f32 = 5.0;
const SEPARATOR_Y: f32 = 35.0;
const TITLE_X: f32 = 50.0;
const TITLE_Y: f32 = 48.0;
const TABLE_TOP_FIRST: f32 = 60.0;
const TABLE_TOP_NEXT: f32 = 40.0;
const BODY_LIMIT: f32 = PAGE_HEIGHT - 20.0;
const FOOTER_X: f32 = PAGE_WIDTH - 30.0;
const FOOTER_Y: f32 = PAGE_HEIGHT - 10.0;
const LOGO_X: f32 = PAGE_WIDTH - 50.0;
const LOGO_Y: f32 = 10.0;
const LOGO_WIDTH: f32 = 40.0;
const LOGO_HEIGHT: f32 = 10.0;

const ORGANIZATION_SIZE: f32 = 14.0;
const LETTERHEAD_SIZE: f32 = 10.0;
const TITLE_SIZE: f32 = 22.0;
const HEAD_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 10.0;
const FOOTER_SIZE: f32 = 10.0;

const PT_TO_MM: f32 = 25.4 / 72.0;
const CELL_PADDING: f32 = 1.5;
const LINE_FACTOR: f32 = 1.15;
/// Average Helvetica glyph width as a fraction of the font size.
const GLYPH_WIDTH: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

const BLACK: Rgb = Rgb(0, 0, 0);
const WHITE: Rgb = Rgb(255, 255, 255);
const HEAD_FILL: Rgb = Rgb(64, 133, 126);
const STRIPE_FILL: Rgb = Rgb(245, 245, 245);

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// `y` is the text baseline.
    Text {
        x: f32,
        y: f32,
        size: f32,
        bold: bool,
        color: Rgb,
        text: String,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    /// Places the document logo; `y` is the top edge.
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportPage {
    pub ops: Vec<DrawOp>,
}

impl ReportPage {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub page_width: f32,
    pub page_height: f32,
    pub pages: Vec<ReportPage>,
    pub logo: Option<LogoImage>,
    /// Number of body rows laid out across all pages.
    pub row_count: usize,
}

impl ReportDocument {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(ReportPage::texts)
    }

    pub fn image_count(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|page| page.ops.iter())
            .filter(|op| matches!(op, DrawOp::Image { .. }))
            .count()
    }
}

struct LaidRow {
    cells: Vec<Vec<String>>,
    height: f32,
}

/// Lays `rows` out as a paginated table under the template's letterhead.
///
/// Pagination runs first; the footer of every page is drawn afterwards so it
/// can carry the final page count.
pub fn layout_report(
    rows: &[Record],
    template: &ReportTemplate,
    logo: Option<LogoImage>,
) -> ReportDocument {
    let widths = column_widths(rows, template);
    let head = lay_row(
        template.columns.iter().map(|c| c.title.clone()).collect(),
        &widths,
        HEAD_SIZE,
        usize::MAX,
    );
    let max_lines = max_body_lines(head.height);
    let body: Vec<LaidRow> = rows
        .iter()
        .map(|record| {
            let cells = template.columns.iter().map(|c| c.cell(record)).collect();
            lay_row(cells, &widths, BODY_SIZE, max_lines)
        })
        .collect();

    let page_rows = paginate(&body, head.height);
    let total = page_rows.len();
    let mut row_index = 0;
    let pages = page_rows
        .iter()
        .enumerate()
        .map(|(page_index, page_body)| {
            let mut page = ReportPage::default();
            draw_letterhead(&mut page, template, logo.is_some());
            if page_index == 0 {
                page.ops.push(text(TITLE_X, TITLE_Y, TITLE_SIZE, false, BLACK, &template.title));
            }
            let mut y = if page_index == 0 {
                TABLE_TOP_FIRST
            } else {
                TABLE_TOP_NEXT
            };
            draw_row(&mut page, &head, &widths, y, HEAD_SIZE, true, Some(HEAD_FILL), WHITE);
            y += head.height;
            for row in page_body {
                let fill = (row_index % 2 == 1).then_some(STRIPE_FILL);
                draw_row(&mut page, row, &widths, y, BODY_SIZE, false, fill, BLACK);
                y += row.height;
                row_index += 1;
            }
            let footer = format!("Page {} of {}", page_index + 1, total);
            page.ops.push(text(FOOTER_X, FOOTER_Y, FOOTER_SIZE, false, BLACK, &footer));
            page
        })
        .collect();

    ReportDocument {
        page_width: PAGE_WIDTH,
        page_height: PAGE_HEIGHT,
        pages,
        logo,
        row_count: rows.len(),
    }
}

fn paginate(body: &[LaidRow], head_height: f32) -> Vec<Vec<&LaidRow>> {
    let mut pages: Vec<Vec<&LaidRow>> = vec![Vec::new()];
    let mut y = TABLE_TOP_FIRST + head_height;
    for row in body {
        let current_has_rows = pages.last().is_some_and(|page| !page.is_empty());
        if y + row.height > BODY_LIMIT && current_has_rows {
            pages.push(Vec::new());
            y = TABLE_TOP_NEXT + head_height;
        }
        if let Some(page) = pages.last_mut() {
            page.push(row);
        }
        y += row.height;
    }
    pages
}

fn draw_letterhead(page: &mut ReportPage, template: &ReportTemplate, with_logo: bool) {
    let letterhead = &template.letterhead;
    page.ops.push(text(
        MARGIN,
        LETTERHEAD_TOP,
        ORGANIZATION_SIZE,
        true,
        BLACK,
        &letterhead.organization,
    ));
    let lines = letterhead
        .address_lines
        .iter()
        .chain(letterhead.contact_lines.iter());
    for (index, line) in lines.enumerate() {
        let y = LETTERHEAD_TOP + LETTERHEAD_STEP * (index as f32 + 1.0);
        page.ops.push(text(MARGIN, y, LETTERHEAD_SIZE, false, BLACK, line));
    }
    if with_logo {
        page.ops.push(DrawOp::Image {
            x: LOGO_X,
            y: LOGO_Y,
            width: LOGO_WIDTH,
            height: LOGO_HEIGHT,
        });
    }
    page.ops.push(DrawOp::Line {
        x1: MARGIN,
        y1: SEPARATOR_Y,
        x2: PAGE_WIDTH - MARGIN,
        y2: SEPARATOR_Y,
    });
}

#[allow(clippy::too_many_arguments)]
fn draw_row(
    page: &mut ReportPage,
    row: &LaidRow,
    widths: &[f32],
    top: f32,
    size: f32,
    bold: bool,
    fill: Option<Rgb>,
    color: Rgb,
) {
    if let Some(fill) = fill {
        page.ops.push(DrawOp::FillRect {
            x: MARGIN,
            y: top,
            width: widths.iter().sum(),
            height: row.height,
            color: fill,
        });
    }
    let line_height = line_height(size);
    let mut x = MARGIN;
    for (lines, width) in row.cells.iter().zip(widths) {
        for (index, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let baseline = top + CELL_PADDING + size * PT_TO_MM + line_height * index as f32;
            page.ops.push(text(x + CELL_PADDING, baseline, size, bold, color, line));
        }
        x += width;
    }
}

/// Most body lines a row may hold and still fit under the heading on the
/// first page, which has the least room.
fn max_body_lines(head_height: f32) -> usize {
    let room = BODY_LIMIT - TABLE_TOP_FIRST - head_height - 2.0 * CELL_PADDING;
    ((room / line_height(BODY_SIZE)).floor() as usize).max(1)
}

fn lay_row(cells: Vec<String>, widths: &[f32], size: f32, max_lines: usize) -> LaidRow {
    let cells: Vec<Vec<String>> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let max_chars = chars_per_line(*width, size);
            clamp_lines(wrap_text(cell, max_chars), max_lines, max_chars)
        })
        .collect();
    let lines = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
    LaidRow {
        cells,
        height: lines as f32 * line_height(size) + 2.0 * CELL_PADDING,
    }
}

/// Splits available width in proportion to each column's widest content.
fn column_widths(rows: &[Record], template: &ReportTemplate) -> Vec<f32> {
    let weights: Vec<f32> = template
        .columns
        .iter()
        .map(|column| {
            let widest = rows
                .iter()
                .map(|record| column.cell(record).chars().count())
                .max()
                .unwrap_or(0)
                .max(column.title.chars().count());
            widest.clamp(4, 40) as f32
        })
        .collect();
    let total: f32 = weights.iter().sum();
    let available = PAGE_WIDTH - 2.0 * MARGIN;
    weights
        .iter()
        .map(|weight| available * weight / total.max(1.0))
        .collect()
}

fn line_height(size: f32) -> f32 {
    size * PT_TO_MM * LINE_FACTOR
}

fn chars_per_line(width: f32, size: f32) -> usize {
    let glyph = size * PT_TO_MM * GLYPH_WIDTH;
    (((width - 2.0 * CELL_PADDING) / glyph).floor() as usize).max(1)
}

/// Greedy word wrap; words longer than a line are split.
pub(crate) fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let current_len = current.chars().count();
        if !current.is_empty() && current_len + 1 + word.len() > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Cuts a wrapped cell to `max_lines`, ending the last kept line with an
/// ellipsis.
fn clamp_lines(mut lines: Vec<String>, max_lines: usize, max_chars: usize) -> Vec<String> {
    if lines.len() <= max_lines {
        return lines;
    }
    lines.truncate(max_lines);
    if let Some(last) = lines.last_mut() {
        let keep = max_chars.saturating_sub(3);
        let mut cut: String = last.chars().take(keep).collect();
        cut.push_str("...");
        *last = cut;
    }
    lines
}

fn text(x: f32, y: f32, size: f32, bold: bool, color: Rgb, value: &str) -> DrawOp {
    DrawOp::Text {
        x,
        y,
        size,
        bold,
        color,
        text: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_breaks_on_words_and_splits_long_words() {
        assert_eq!(wrap_text("alpha beta gamma", 11), vec!["alpha beta", "gamma"]);
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap_text("", 5), vec![""]);
        assert_eq!(wrap_text("ab abcdefg", 4), vec!["ab", "abcd", "efg"]);
    }

    #[test]
    fn taller_rows_wrap_instead_of_overflowing() {
        let row = lay_row(
            vec!["short".to_string(), "a much longer value".to_string()],
            &[30.0, 12.0],
            BODY_SIZE,
            usize::MAX,
        );
        assert_eq!(row.cells[0].len(), 1);
        assert!(row.cells[1].len() > 1);
        assert!(row.height > line_height(BODY_SIZE) * 2.0);
    }

    #[test]
    fn oversized_cell_is_clamped_to_one_page() {
        use std::collections::BTreeMap;

        use records_core::{FieldValue, RecordId};

        let location = "Kandy estate block ".repeat(160);
        let mut fields = BTreeMap::new();
        fields.insert("eqname".to_string(), FieldValue::text("Irrigation pump"));
        fields.insert("referredlocation".to_string(), FieldValue::text(location));
        let rows = vec![
            Record::new(RecordId::new("r1"), fields.clone()),
            Record::new(RecordId::new("r2"), fields),
        ];

        let document = layout_report(&rows, &ReportTemplate::maintenance(), None);

        assert_eq!(document.pages.len(), 2);
        for page in &document.pages {
            for op in &page.ops {
                if let DrawOp::Text { y, text, .. } = op {
                    if !text.starts_with("Page ") {
                        assert!(*y <= BODY_LIMIT, "{text:?} drawn at {y}");
                    }
                }
                if let DrawOp::FillRect { y, height, .. } = op {
                    assert!(y + height <= BODY_LIMIT + 0.01);
                }
            }
        }
        assert!(document.texts().any(|line| line.ends_with("...")));
    }
}
