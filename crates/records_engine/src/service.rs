use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use url::Url;

use console_logging::console_debug;
use records_core::{Record, RecordId, RecordPatch};

use crate::ingest::{parse_collection, parse_error_message, parse_single};
use crate::{FailureKind, ServiceError};

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Root of the record API, e.g. `http://localhost:5000/api`.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Remote record collection, one resource (e.g. `maintenance`) at a time.
#[async_trait::async_trait]
pub trait RecordService: Send + Sync {
    async fn list(&self, resource: &str) -> Result<Vec<Record>, ServiceError>;

    async fn create(&self, resource: &str, fields: &RecordPatch) -> Result<Record, ServiceError>;

    async fn update(
        &self,
        resource: &str,
        id: &RecordId,
        patch: &RecordPatch,
    ) -> Result<(), ServiceError>;

    async fn delete(&self, resource: &str, id: &RecordId) -> Result<(), ServiceError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestRecordService {
    settings: ServiceSettings,
    client: reqwest::Client,
}

impl ReqwestRecordService {
    pub fn new(settings: ServiceSettings) -> Result<Self, ServiceError> {
        let client = build_client(&settings)?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    fn endpoint(&self, resource: &str, id: Option<&RecordId>) -> Result<Url, ServiceError> {
        let mut url = Url::parse(&self.settings.base_url)
            .map_err(|err| ServiceError::new(FailureKind::InvalidUrl, err.to_string()))?;
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                ServiceError::new(FailureKind::InvalidUrl, "base url cannot carry a path")
            })?;
            segments.pop_if_empty().push(resource);
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>, ServiceError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            // The error body is optional; an unreadable one just loses the message.
            let body = read_limited(response, self.settings.max_bytes)
                .await
                .unwrap_or_default();
            return Err(
                ServiceError::new(FailureKind::HttpStatus(status.as_u16()), status.to_string())
                    .with_server_message(parse_error_message(&body)),
            );
        }
        read_limited(response, self.settings.max_bytes).await
    }
}

#[async_trait::async_trait]
impl RecordService for ReqwestRecordService {
    async fn list(&self, resource: &str) -> Result<Vec<Record>, ServiceError> {
        let url = self.endpoint(resource, None)?;
        console_debug!("GET {}", url);
        let body = self.send(self.client.get(url)).await?;
        parse_collection(&body)
    }

    async fn create(&self, resource: &str, fields: &RecordPatch) -> Result<Record, ServiceError> {
        let url = self.endpoint(resource, None)?;
        console_debug!("POST {}", url);
        let body = self.send(json_request(self.client.post(url), &fields.to_json())).await?;
        parse_single(&body)
    }

    async fn update(
        &self,
        resource: &str,
        id: &RecordId,
        patch: &RecordPatch,
    ) -> Result<(), ServiceError> {
        let url = self.endpoint(resource, Some(id))?;
        console_debug!("PUT {}", url);
        self.send(json_request(self.client.put(url), &patch.to_json()))
            .await
            .map(|_| ())
    }

    async fn delete(&self, resource: &str, id: &RecordId) -> Result<(), ServiceError> {
        let url = self.endpoint(resource, Some(id))?;
        console_debug!("DELETE {}", url);
        self.send(self.client.delete(url)).await.map(|_| ())
    }
}

pub(crate) fn build_client(settings: &ServiceSettings) -> Result<reqwest::Client, ServiceError> {
    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.request_timeout)
        .build()
        .map_err(|err| ServiceError::new(FailureKind::Network, err.to_string()))
}

fn json_request(request: reqwest::RequestBuilder, body: &Value) -> reqwest::RequestBuilder {
    request
        .header(CONTENT_TYPE, "application/json")
        .body(body.to_string())
}

/// Streams the body, failing as soon as it exceeds `max_bytes`.
pub(crate) async fn read_limited(
    response: reqwest::Response,
    max_bytes: u64,
) -> Result<Vec<u8>, ServiceError> {
    if let Some(content_len) = response.content_length() {
        if content_len > max_bytes {
            return Err(ServiceError::new(
                FailureKind::TooLarge {
                    max_bytes,
                    actual: Some(content_len),
                },
                "response too large",
            ));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(map_reqwest_error)?;
        let next_len = bytes.len() as u64 + chunk.len() as u64;
        if next_len > max_bytes {
            return Err(ServiceError::new(
                FailureKind::TooLarge {
                    max_bytes,
                    actual: Some(next_len),
                },
                "response too large",
            ));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        return ServiceError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return ServiceError::new(FailureKind::InvalidUrl, err.to_string());
    }
    ServiceError::new(FailureKind::Network, err.to_string())
}
