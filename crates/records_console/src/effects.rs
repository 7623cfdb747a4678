use std::path::PathBuf;
use std::time::Duration;

use console_logging::{console_info, console_warn};
use records_core::{Effect, Msg, MutationFailure, RecordId};
use records_engine::report::ReportTemplate;
use records_engine::{Collision, EngineEvent, EngineHandle, ExportRequest, LogoSource};

/// Everything an export needs besides the rows.
#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub template: ReportTemplate,
    pub logo: Option<LogoSource>,
    pub output_dir: PathBuf,
    pub collision: Collision,
}

/// Hands core effects to the engine and turns engine events back into
/// messages.
///
/// Reports are counted apart from record requests: a report may wait on a
/// slow logo fetch and callers keep working with the table meanwhile.
pub struct EffectRunner {
    engine: EngineHandle,
    export: ExportSettings,
    requests: usize,
    reports: usize,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, export: ExportSettings) -> Self {
        Self {
            engine,
            export,
            requests: 0,
            reports: 0,
        }
    }

    /// Starts engine work for each effect. Edit navigation has no engine
    /// counterpart; those ids are returned for the caller to handle.
    pub fn enqueue(&mut self, effects: Vec<Effect>) -> Vec<RecordId> {
        let mut edits = Vec::new();
        for effect in effects {
            match effect {
                Effect::FetchCollection => {
                    self.requests += 1;
                    self.engine.fetch();
                }
                Effect::DeleteRecord { id } => {
                    console_info!("Deleting record {}", id);
                    self.requests += 1;
                    self.engine.delete(id);
                }
                Effect::UpdateRecord { id, patch } => {
                    console_info!("Updating record {}", id);
                    self.requests += 1;
                    self.engine.update(id, patch);
                }
                Effect::GenerateReport { rows } => {
                    console_info!("Generating report with {} rows", rows.len());
                    self.reports += 1;
                    self.engine.export(ExportRequest {
                        rows,
                        template: self.export.template.clone(),
                        logo: self.export.logo.clone(),
                        output_dir: self.export.output_dir.clone(),
                        collision: self.export.collision,
                    });
                }
                Effect::NavigateToEdit { id } => edits.push(id),
            }
        }
        edits
    }

    /// Fetch, delete and update requests without a result yet.
    pub fn requests_pending(&self) -> usize {
        self.requests
    }

    /// Report exports without a result yet.
    pub fn reports_pending(&self) -> usize {
        self.reports
    }

    /// Waits up to `timeout` for the next engine result.
    pub fn next_msg(&mut self, timeout: Duration) -> Option<Msg> {
        let event = self.engine.recv_timeout(timeout)?;
        Some(self.settle_event(event))
    }

    /// Takes an engine result only if one is already waiting.
    pub fn try_next_msg(&mut self) -> Option<Msg> {
        let event = self.engine.try_recv()?;
        Some(self.settle_event(event))
    }

    fn settle_event(&mut self, event: EngineEvent) -> Msg {
        let counter = match event {
            EngineEvent::ReportFinished(_) => &mut self.reports,
            _ => &mut self.requests,
        };
        *counter = counter.saturating_sub(1);
        map_event(event)
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::CollectionFetched(Ok(records)) => Msg::CollectionLoaded(records),
        EngineEvent::CollectionFetched(Err(err)) => {
            console_warn!("Failed to load records: {}", err);
            Msg::CollectionLoadFailed
        }
        EngineEvent::DeleteCompleted { id, result } => Msg::DeleteFinished {
            result: result.map_err(|err| {
                console_warn!("Error deleting record {}: {}", id, err);
                MutationFailure::from(err)
            }),
            id,
        },
        EngineEvent::UpdateCompleted { id, patch, result } => Msg::UpdateFinished {
            result: result.map_err(|err| {
                console_warn!("Error updating record {}: {}", id, err);
                MutationFailure::from(err)
            }),
            id,
            patch,
        },
        EngineEvent::ReportFinished(result) => Msg::ReportFinished(
            result
                .map(|summary| summary.path.display().to_string())
                .map_err(|err| {
                    console_warn!("Report export failed: {}", err);
                    err.to_string()
                }),
        ),
    }
}
