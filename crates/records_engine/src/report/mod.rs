//! Report generation: template, pagination/layout, and PDF serialization.
mod layout;
mod pdf;
mod template;

pub use layout::{layout_report, DrawOp, ReportDocument, ReportPage, Rgb, PAGE_HEIGHT, PAGE_WIDTH};
pub use pdf::render_pdf;
pub use template::{ColumnFormat, Letterhead, ReportColumn, ReportTemplate};
