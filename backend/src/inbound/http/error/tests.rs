//! Tests for HTTP error rendering.

use super::*;
use actix_web::body::to_bytes;
use rstest::rstest;
use rstest_bdd_macros::{given, then, when};
use serde_json::{Value, json};

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[rstest]
#[case(ErrorCode::InvalidRequest, StatusCode::BAD_REQUEST)]
#[case(ErrorCode::InvalidInput, StatusCode::BAD_REQUEST)]
#[case(ErrorCode::Unauthorized, StatusCode::UNAUTHORIZED)]
#[case(ErrorCode::NotFound, StatusCode::NOT_FOUND)]
#[case(ErrorCode::SchemaUnavailable, StatusCode::NOT_FOUND)]
#[case(ErrorCode::MissingKey, StatusCode::CONFLICT)]
#[case(ErrorCode::EmptyCatalog, StatusCode::CONFLICT)]
#[case(ErrorCode::StoreFailure, StatusCode::BAD_GATEWAY)]
#[case(ErrorCode::ServiceUnavailable, StatusCode::SERVICE_UNAVAILABLE)]
#[case(ErrorCode::InternalError, StatusCode::INTERNAL_SERVER_ERROR)]
fn every_code_has_a_status(#[case] code: ErrorCode, #[case] status: StatusCode) {
    let error = Error::new(code, "failure");
    assert_eq!(ResponseError::status_code(&error), status);
}

/// Render `error` and return the trace header plus the JSON body.
async fn render(error: &Error) -> (StatusCode, Option<String>, Value) {
    let response = ResponseError::error_response(error);
    let status = response.status();
    let trace = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body())
        .await
        .expect("error body is readable");
    let body = serde_json::from_slice(&bytes).expect("error body is JSON");
    (status, trace, body)
}

#[rstest]
#[actix_web::test]
async fn coercion_failures_keep_their_details() {
    let error = Error::invalid_input("capacity_total expects an integer")
        .with_trace_id(TRACE_ID)
        .with_details(json!({"column": "capacity_total", "value": "many"}));

    let (status, trace, body) = render(&error).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(trace.as_deref(), Some(TRACE_ID));
    assert_eq!(body["code"], "invalid_input");
    assert_eq!(body["traceId"], TRACE_ID);
    assert_eq!(body["details"]["column"], "capacity_total");
}

#[rstest]
#[actix_web::test]
async fn store_failures_surface_the_store_message() {
    let error = Error::store_failure("statement was not applied: duplicate key")
        .with_details(json!({"kind": "constraint"}));

    let (status, trace, body) = render(&error).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(trace.is_none());
    assert_eq!(body["message"], "statement was not applied: duplicate key");
    assert_eq!(body["details"]["kind"], "constraint");
}

#[rstest]
#[actix_web::test]
async fn internal_errors_hide_details_but_keep_trace() {
    let error = Error::internal("pool exhausted at 10.0.0.4")
        .with_trace_id(TRACE_ID)
        .with_details(json!({"host": "10.0.0.4"}));

    let (status, trace, body) = render(&error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(trace.as_deref(), Some(TRACE_ID));
    assert_eq!(body["message"], "Internal server error");
    assert_eq!(body["traceId"], TRACE_ID);
    assert!(body.get("details").is_none());
}

#[given("a missing primary key error")]
fn a_missing_primary_key_error() -> Error {
    Error::missing_key("staging has no primary key").with_details(json!({"table": "staging"}))
}

#[when("the adapter renders it")]
fn the_adapter_renders_it(error: Error) -> Error {
    redact_if_internal(&error)
}

#[then("the client sees a conflict with the table named")]
fn the_client_sees_a_conflict(rendered: Error) {
    assert_eq!(status_for(rendered.code()), StatusCode::CONFLICT);
    assert_eq!(rendered.details(), Some(&json!({"table": "staging"})));
}

#[rstest]
fn missing_keys_pass_through_unredacted() {
    let error = a_missing_primary_key_error();
    let rendered = the_adapter_renders_it(error);
    the_client_sees_a_conflict(rendered);
}

#[rstest]
fn framework_errors_become_redacted_internal_errors() {
    let err: Error = actix_web::error::ErrorBadRequest("boom").into();

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Internal server error");
    assert_eq!(err.trace_id(), None);
    assert_eq!(err.details(), None);
}
