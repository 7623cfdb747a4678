use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::{Map, Value};

/// Field names the service uses for the stable identifier, in lookup order.
pub const ID_FIELDS: [&str; 2] = ["_id", "id"];
/// Field holding the free-text status label.
pub const STATUS_FIELD: &str = "status";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("record has no `_id` or `id` field")]
    MissingId,
    #[error("record id has unsupported type: {0}")]
    InvalidId(String),
}

/// Closed set of status labels the console understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    InProgress,
    Completed,
}

impl Status {
    pub const ALL: [Status; 2] = [Status::InProgress, Status::Completed];

    /// Parses a free-text label from the service. Unknown labels yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "in progress" => Some(Status::InProgress),
            "completed" => Some(Status::Completed),
            _ => None,
        }
    }

    /// Lower-cased bucket key, as the service spells it.
    pub fn key(self) -> &'static str {
        match self {
            Status::InProgress => "in progress",
            Status::Completed => "completed",
        }
    }

    /// Display label used by the chart legend.
    pub fn label(self) -> &'static str {
        match self {
            Status::InProgress => "In Progress",
            Status::Completed => "Completed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A scalar field value as ingested from the service.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    /// A date-like string. `raw` is the text exactly as stored; `at` is
    /// only used for ordering and report cells.
    Date { at: DateTime<Utc>, raw: String },
    Text(String),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => n
                .as_f64()
                .map(FieldValue::Number)
                .unwrap_or_else(|| FieldValue::Text(n.to_string())),
            Value::String(s) => match parse_date(s) {
                Some(at) => FieldValue::Date { at, raw: s.clone() },
                None => FieldValue::Text(s.clone()),
            },
            Value::Array(_) | Value::Object(_) => FieldValue::Text(value.to_string()),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Date { raw, .. } | FieldValue::Text(raw) => Value::String(raw.clone()),
        }
    }

    /// Total, lossless text form used by the free-text filter.
    pub fn to_search_text(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Date { raw, .. } | FieldValue::Text(raw) => raw.clone(),
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Date { at, .. } => Some(*at),
            FieldValue::Text(s) => parse_date(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_search_text())
    }
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: RecordId,
    fields: BTreeMap<String, FieldValue>,
    status: Option<Status>,
}

impl Record {
    pub fn new(id: RecordId, fields: BTreeMap<String, FieldValue>) -> Self {
        let status = derive_status(&fields);
        Self { id, fields, status }
    }

    /// Ingests one service object, converting its status label once.
    pub fn from_json(value: &Value) -> Result<Self, RecordError> {
        let object = value.as_object().ok_or(RecordError::NotAnObject)?;
        let id = extract_id(object)?;
        let fields = object
            .iter()
            .map(|(name, value)| (name.clone(), FieldValue::from_json(value)))
            .collect();
        Ok(Self::new(id, fields))
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn status(&self) -> Option<Status> {
        self.status
    }

    /// Merges the patch into this record. Identifier fields are never overwritten.
    pub fn merge(&mut self, patch: &RecordPatch) {
        for (name, value) in patch.fields() {
            if ID_FIELDS.contains(&name) {
                continue;
            }
            self.fields.insert(name.to_string(), value.clone());
        }
        self.status = derive_status(&self.fields);
    }
}

fn derive_status(fields: &BTreeMap<String, FieldValue>) -> Option<Status> {
    match fields.get(STATUS_FIELD)? {
        FieldValue::Text(raw) => Status::parse(raw),
        _ => None,
    }
}

fn extract_id(object: &Map<String, Value>) -> Result<RecordId, RecordError> {
    let value = ID_FIELDS
        .iter()
        .find_map(|name| object.get(*name))
        .ok_or(RecordError::MissingId)?;
    match value {
        Value::String(s) if !s.is_empty() => Ok(RecordId::new(s.clone())),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(RecordId::new(n.to_string())),
        other => Err(RecordError::InvalidId(other.to_string())),
    }
}

/// Partial field update produced by an edit flow.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordPatch {
    fields: BTreeMap<String, FieldValue>,
}

impl RecordPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn from_json(value: &Value) -> Result<Self, RecordError> {
        let object = value.as_object().ok_or(RecordError::NotAnObject)?;
        Ok(Self {
            fields: object
                .iter()
                .map(|(name, value)| (name.clone(), FieldValue::from_json(value)))
                .collect(),
        })
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
