use std::time::Duration;

use pretty_assertions::assert_eq;
use records_core::{FieldValue, MutationFailure, RecordId, RecordPatch, Status};
use records_engine::{FailureKind, RecordService, ReqwestRecordService, ServiceSettings};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service_for(server: &MockServer) -> ReqwestRecordService {
    ReqwestRecordService::new(ServiceSettings {
        base_url: format!("{}/api", server.uri()),
        ..ServiceSettings::default()
    })
    .expect("client")
}

#[tokio::test]
async fn list_reads_data_envelope_and_skips_invalid_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/maintenance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"_id": "64a1", "eqname": "Drill", "quantity": 2, "status": "Completed"},
                {"eqname": "no id"},
                {"_id": "64a2", "eqname": "Saw", "status": "in progress"}
            ]
        })))
        .mount(&server)
        .await;

    let records = service_for(&server).list("maintenance").await.expect("list ok");
    let ids: Vec<_> = records.iter().map(|r| r.id().to_string()).collect();
    assert_eq!(ids, vec!["64a1", "64a2"]);
    assert_eq!(records[0].status(), Some(Status::Completed));
    assert_eq!(records[0].field("quantity"), Some(&FieldValue::Number(2.0)));
}

#[tokio::test]
async fn list_without_envelope_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/maintenance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"_id": "1"}])))
        .mount(&server)
        .await;

    let err = service_for(&server).list("maintenance").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn list_fails_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/maintenance"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = service_for(&server).list("maintenance").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
    assert_eq!(err.server_message, None);
}

#[tokio::test]
async fn delete_succeeds_without_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/maintenance/64a1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    service_for(&server)
        .delete("maintenance", &RecordId::from("64a1"))
        .await
        .expect("delete ok");
}

#[tokio::test]
async fn delete_not_found_carries_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/maintenance/2"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "not found"})))
        .mount(&server)
        .await;

    let err = service_for(&server)
        .delete("maintenance", &RecordId::from("2"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
    assert_eq!(err.server_message.as_deref(), Some("not found"));

    let failure = MutationFailure::from(err);
    assert_eq!(failure.server_message.as_deref(), Some("not found"));
}

#[tokio::test]
async fn update_puts_patch_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/maintenance/64a1"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"status": "Completed", "quantity": 3.0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "updated"})))
        .expect(1)
        .mount(&server)
        .await;

    let patch = RecordPatch::new()
        .with("status", FieldValue::text("Completed"))
        .with("quantity", FieldValue::Number(3.0));
    service_for(&server)
        .update("maintenance", &RecordId::from("64a1"), &patch)
        .await
        .expect("update ok");
}

#[tokio::test]
async fn create_returns_stored_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/maintenance"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"_id": "new1", "eqname": "Sprayer", "status": "In Progress"}
        })))
        .mount(&server)
        .await;

    let fields = RecordPatch::new().with("eqname", FieldValue::text("Sprayer"));
    let record = service_for(&server)
        .create("maintenance", &fields)
        .await
        .expect("create ok");
    assert_eq!(record.id(), &RecordId::from("new1"));
    assert_eq!(record.status(), Some(Status::InProgress));
}

#[tokio::test]
async fn slow_service_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/maintenance"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({"data": []})),
        )
        .mount(&server)
        .await;

    let service = ReqwestRecordService::new(ServiceSettings {
        base_url: format!("{}/api", server.uri()),
        request_timeout: Duration::from_millis(50),
        ..ServiceSettings::default()
    })
    .expect("client");

    let err = service.list("maintenance").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn oversized_collection_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/maintenance"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"data\": []}    "))
        .mount(&server)
        .await;

    let service = ReqwestRecordService::new(ServiceSettings {
        base_url: format!("{}/api", server.uri()),
        max_bytes: 8,
        ..ServiceSettings::default()
    })
    .expect("client");

    let err = service.list("maintenance").await.unwrap_err();
    assert!(matches!(err.kind, FailureKind::TooLarge { max_bytes: 8, .. }));
}

#[tokio::test]
async fn ids_are_path_escaped() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/maintenance/a%2Fb"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    service_for(&server)
        .delete("maintenance", &RecordId::from("a/b"))
        .await
        .expect("delete ok");
}
