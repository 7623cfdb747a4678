use serde_json::Value;

use console_logging::console_warn;
use records_core::Record;

use crate::{FailureKind, ServiceError};

/// Parses a `{ "data": [...] }` list response. Entries that are not valid
/// records are logged and skipped; a malformed envelope is an error.
pub fn parse_collection(body: &[u8]) -> Result<Vec<Record>, ServiceError> {
    let envelope: Value = serde_json::from_slice(body)
        .map_err(|err| ServiceError::new(FailureKind::Decode, err.to_string()))?;
    let items = envelope
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| ServiceError::new(FailureKind::Decode, "missing `data` array"))?;

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match Record::from_json(item) {
            Ok(record) => records.push(record),
            Err(err) => console_warn!("Skipping record #{} in collection: {}", index, err),
        }
    }
    Ok(records)
}

/// Parses a single-record response, either bare or wrapped in `data`.
pub fn parse_single(body: &[u8]) -> Result<Record, ServiceError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|err| ServiceError::new(FailureKind::Decode, err.to_string()))?;
    let inner = match value.get("data") {
        Some(data) if data.is_object() => data,
        _ => &value,
    };
    Record::from_json(inner).map_err(|err| ServiceError::new(FailureKind::Decode, err.to_string()))
}

/// Extracts `message` from an error body, if the body is JSON and has one.
pub fn parse_error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value
        .get("message")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
}
