//! Integration tests for the push notification endpoint.
//!
//! Drives the real router with a mock load engine: happy-path finalize,
//! skipped event types, malformed envelopes, and every downstream failure
//! mode, asserting the engine sees exactly the submissions it should.

use std::sync::Arc;

use autoload_api::create_router;
use autoload_core::runtime::Runtime;
use autoload_engine::mock::{MockEngine, MockOutcome};
use autoload_engine::{JobError, SchemaUpdateOption, TableRef, WriteDisposition};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use tower::ServiceExt;

fn app_with(engine: Arc<MockEngine>) -> Router {
    let runtime = Arc::new(Runtime::new(TableRef::new("proj", "ds", "tbl"), engine));
    create_router(runtime).0
}

fn finalize_body(bucket: &str, object: &str, event_type: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "message": {
            "id": "1",
            "attributes": {
                "bucketId": bucket,
                "objectId": object,
                "eventType": event_type
            }
        }
    }))
    .expect("serialize body")
}

async fn post(app: Router, body: impl Into<Body>) -> (StatusCode, Vec<u8>) {
    send(app, "POST", "/", body).await
}

async fn send(app: Router, method: &str, uri: &str, body: impl Into<Body>) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .expect("build request");

    let response = app.oneshot(request).await.expect("execute request");
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");

    (status, body.to_vec())
}

#[tokio::test]
async fn finalize_event_triggers_exactly_one_load() {
    let engine = Arc::new(MockEngine::new());
    let app = app_with(engine.clone());

    let (status, body) = post(app, finalize_body("b", "o.json", "OBJECT_FINALIZE")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    let submissions = engine.submissions();
    assert_eq!(submissions.len(), 1);
    let request = &submissions[0];
    assert_eq!(request.source.uri(), "gs://b/o.json");
    assert_eq!(request.destination, TableRef::new("proj", "ds", "tbl"));
    assert_eq!(request.options.write, WriteDisposition::Append);
    assert_eq!(
        request.options.schema_update,
        vec![
            SchemaUpdateOption::AllowFieldAddition,
            SchemaUpdateOption::AllowFieldRelaxation
        ]
    );
}

#[tokio::test]
async fn delete_event_is_acknowledged_without_a_load() {
    let engine = Arc::new(MockEngine::new());
    let app = app_with(engine.clone());

    let (status, body) = post(app, finalize_body("b", "o.json", "OBJECT_DELETE")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
    assert!(engine.submissions().is_empty());
}

#[tokio::test]
async fn missing_event_type_is_acknowledged_without_a_load() {
    let engine = Arc::new(MockEngine::new());
    let app = app_with(engine.clone());

    let body = serde_json::to_vec(&json!({
        "message": { "id": "1", "attributes": { "bucketId": "b", "objectId": "o.json" } }
    }))
    .unwrap();
    let (status, _) = post(app, body).await;

    assert_eq!(status, StatusCode::OK);
    assert!(engine.submissions().is_empty());
}

#[tokio::test]
async fn malformed_json_body_is_rejected_without_engine_call() {
    let engine = Arc::new(MockEngine::new());
    let app = app_with(engine.clone());

    let (status, body) = post(app, "{not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.is_empty());
    assert!(engine.submissions().is_empty());
}

#[tokio::test]
async fn invalid_base64_payload_is_rejected() {
    let engine = Arc::new(MockEngine::new());
    let app = app_with(engine.clone());

    let body = serde_json::to_vec(&json!({
        "message": { "id": "1", "data": "not base64!!" }
    }))
    .unwrap();
    let (status, _) = post(app, body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(engine.submissions().is_empty());
}

#[tokio::test]
async fn rejected_submission_maps_to_internal_error() {
    let engine = Arc::new(MockEngine::with_outcome(MockOutcome::RejectSubmission(
        "malformed source reference".to_string(),
    )));
    let app = app_with(engine.clone());

    let (status, body) = post(app, finalize_body("b", "o.json", "OBJECT_FINALIZE")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.is_empty());
    assert!(engine.submissions().is_empty());
}

#[tokio::test]
async fn broken_wait_maps_to_internal_error() {
    let engine = Arc::new(MockEngine::with_outcome(MockOutcome::FailWait(
        "connection lost".to_string(),
    )));
    let app = app_with(engine.clone());

    let (status, _) = post(app, finalize_body("b", "o.json", "OBJECT_FINALIZE")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn job_execution_error_maps_to_internal_error() {
    let engine = Arc::new(MockEngine::with_outcome(
        MockOutcome::CompleteWithJobError(JobError {
            reason: "invalid".to_string(),
            message: "source object not found".to_string(),
        }),
    ));
    let app = app_with(engine.clone());

    let (status, _) = post(app, finalize_body("b", "o.json", "OBJECT_FINALIZE")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn redelivered_finalize_is_not_deduplicated() {
    // Idempotency is intentionally absent: the same notification twice means
    // two accepted load submissions and duplicate appended rows.
    let engine = Arc::new(MockEngine::new());
    let app = app_with(engine.clone());

    let (first, _) = post(app.clone(), finalize_body("b", "o.json", "OBJECT_FINALIZE")).await;
    let (second, _) = post(app, finalize_body("b", "o.json", "OBJECT_FINALIZE")).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);

    let submissions = engine.submissions();
    assert_eq!(submissions.len(), 2);
    assert_eq!(submissions[0], submissions[1]);
}

#[tokio::test]
async fn endpoint_accepts_any_path_and_method() {
    let engine = Arc::new(MockEngine::new());
    let app = app_with(engine.clone());

    let (status, _) = send(
        app,
        "PUT",
        "/some/arbitrary/path",
        finalize_body("b", "o.json", "OBJECT_FINALIZE"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(engine.submissions().len(), 1);
}
