use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use console_logging::console_debug;
use records_core::{RecordId, RecordPatch};

use crate::export::{export_report, ExportRequest};
use crate::service::{RecordService, ReqwestRecordService, ServiceSettings};
use crate::{EngineEvent, ServiceError};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to build record service client: {0}")]
    Service(#[from] ServiceError),
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub settings: ServiceSettings,
    /// Resource segment under the API root, e.g. `maintenance`.
    pub resource: String,
}

enum EngineCommand {
    Fetch,
    Delete { id: RecordId },
    Update { id: RecordId, patch: RecordPatch },
    Export { request: Box<ExportRequest> },
}

/// Runs record service calls and report exports on a background runtime.
///
/// Every command is its own task, so a slow export (logo fetch) never holds up
/// fetches or deletes. Results arrive as [`EngineEvent`]s in completion order.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let service = Arc::new(ReqwestRecordService::new(config.settings.clone())?);
        Self::with_service(service, config)
    }

    pub fn with_service(
        service: Arc<dyn RecordService>,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let config = Arc::new(config);

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let service = service.clone();
                let config = config.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    let event = handle_command(service.as_ref(), &config, command).await;
                    let _ = event_tx.send(event);
                });
            }
            console_debug!("Engine command channel closed; shutting down runtime");
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn fetch(&self) {
        let _ = self.cmd_tx.send(EngineCommand::Fetch);
    }

    pub fn delete(&self, id: RecordId) {
        let _ = self.cmd_tx.send(EngineCommand::Delete { id });
    }

    pub fn update(&self, id: RecordId, patch: RecordPatch) {
        let _ = self.cmd_tx.send(EngineCommand::Update { id, patch });
    }

    pub fn export(&self, request: ExportRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Export {
            request: Box::new(request),
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    service: &dyn RecordService,
    config: &EngineConfig,
    command: EngineCommand,
) -> EngineEvent {
    match command {
        EngineCommand::Fetch => EngineEvent::CollectionFetched(service.list(&config.resource).await),
        EngineCommand::Delete { id } => {
            let result = service.delete(&config.resource, &id).await;
            EngineEvent::DeleteCompleted { id, result }
        }
        EngineCommand::Update { id, patch } => {
            let result = service.update(&config.resource, &id, &patch).await;
            EngineEvent::UpdateCompleted { id, patch, result }
        }
        EngineCommand::Export { request } => {
            EngineEvent::ReportFinished(export_report(&request, &config.settings).await)
        }
    }
}
