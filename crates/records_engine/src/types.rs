use std::fmt;

use records_core::{MutationFailure, Record, RecordId, RecordPatch};

use crate::export::{ExportError, ReportSummary};

#[derive(Debug)]
pub enum EngineEvent {
    CollectionFetched(Result<Vec<Record>, ServiceError>),
    DeleteCompleted {
        id: RecordId,
        result: Result<(), ServiceError>,
    },
    UpdateCompleted {
        id: RecordId,
        patch: RecordPatch,
        result: Result<(), ServiceError>,
    },
    ReportFinished(Result<ReportSummary, ExportError>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ServiceError {
    pub kind: FailureKind,
    pub message: String,
    /// `message` field of the service's JSON error body, if any.
    pub server_message: Option<String>,
}

impl ServiceError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            server_message: None,
        }
    }

    pub fn with_server_message(mut self, server_message: Option<String>) -> Self {
        self.server_message = server_message;
        self
    }
}

impl From<ServiceError> for MutationFailure {
    fn from(err: ServiceError) -> Self {
        MutationFailure {
            detail: format!("{}: {}", err.kind, err.message),
            server_message: err.server_message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "malformed response body"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
