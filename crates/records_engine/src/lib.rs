//! Records engine: record service IO, report rendering, and effect execution.
mod engine;
mod export;
mod ingest;
mod logo;
mod persist;
pub mod report;
mod service;
mod types;

pub use engine::{EngineConfig, EngineError, EngineHandle};
pub use export::{export_report, ExportError, ExportRequest, ReportSummary};
pub use ingest::{parse_collection, parse_error_message, parse_single};
pub use logo::{load_logo, AssetLoadError, ImageEncoding, LogoImage, LogoSource};
pub use persist::{ensure_output_dir, AtomicFileWriter, Collision, PersistError};
pub use service::{RecordService, ReqwestRecordService, ServiceSettings};
pub use types::{EngineEvent, FailureKind, ServiceError};
