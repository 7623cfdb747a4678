use std::path::PathBuf;

use console_logging::{console_info, console_warn};
use records_core::Record;

use crate::persist::{AtomicFileWriter, Collision, PersistError};
use crate::report::{layout_report, render_pdf, ReportTemplate};
use crate::{load_logo, LogoImage, LogoSource, ServiceSettings};

#[derive(Debug, Clone)]
pub struct ExportRequest {
    /// Visible rows at the time of the export, already filtered and sorted.
    pub rows: Vec<Record>,
    pub template: ReportTemplate,
    pub logo: Option<LogoSource>,
    pub output_dir: PathBuf,
    pub collision: Collision,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub path: PathBuf,
    pub pages: usize,
    pub rows: usize,
    pub logo_embedded: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

/// Renders the rows to a PDF in the output directory.
///
/// The logo is best-effort: a failed load is logged and the report is written
/// without it.
pub async fn export_report(
    request: &ExportRequest,
    settings: &ServiceSettings,
) -> Result<ReportSummary, ExportError> {
    let logo = match &request.logo {
        Some(source) => fetch_logo_or_log(source, settings).await,
        None => None,
    };
    let logo_embedded = logo.is_some();

    let document = layout_report(&request.rows, &request.template, logo);
    let bytes = render_pdf(&document);

    let writer = AtomicFileWriter::new(request.output_dir.clone(), request.collision);
    let path = writer.write(&request.template.file_name, &bytes)?;
    console_info!(
        "Report written to {:?}: {} rows on {} pages ({} bytes)",
        path,
        document.row_count,
        document.pages.len(),
        bytes.len()
    );

    Ok(ReportSummary {
        path,
        pages: document.pages.len(),
        rows: document.row_count,
        logo_embedded,
    })
}

async fn fetch_logo_or_log(source: &LogoSource, settings: &ServiceSettings) -> Option<LogoImage> {
    match load_logo(source, settings).await {
        Ok(logo) => Some(logo),
        Err(err) => {
            console_warn!("Failed to load report logo from {}: {}", source, err);
            None
        }
    }
}
