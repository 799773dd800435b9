use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use resty_core::http::{header, Method};
use resty_core::HttpError;

async fn error_parts(err: HttpError) -> (StatusCode, axum::http::HeaderMap, serde_json::Value) {
    let resp = err.into_response();
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    (status, headers, json)
}

#[tokio::test]
async fn bad_request_status() {
    let (status, _, body) = error_parts(HttpError::BadRequest("UNIQUE constraint failed".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "UNIQUE constraint failed");
}

#[tokio::test]
async fn not_found_status() {
    let (status, _, body) = error_parts(HttpError::NotFound("no such animal".into())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "no such animal");
}

#[tokio::test]
async fn configuration_is_server_error() {
    let (status, _, body) =
        error_parts(HttpError::Configuration("No list_serializer or serializer defined on X".into())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "No list_serializer or serializer defined on X");
}

#[tokio::test]
async fn internal_is_server_error() {
    let (status, _, _) = error_parts(HttpError::Internal("pool closed".into())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn method_not_allowed_lists_allowed_set() {
    let (status, headers, body) = error_parts(HttpError::MethodNotAllowed {
        allowed: vec![Method::GET, Method::POST],
    })
    .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["allowed"], serde_json::json!(["GET", "POST"]));
    assert_eq!(headers.get(header::ALLOW).unwrap(), "GET, POST");
}

#[tokio::test]
async fn method_not_allowed_with_empty_set() {
    let (status, headers, body) = error_parts(HttpError::MethodNotAllowed { allowed: vec![] }).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["allowed"], serde_json::json!([]));
    assert_eq!(headers.get(header::ALLOW).unwrap(), "");
}

#[test]
fn display_formatting() {
    assert_eq!(HttpError::BadRequest("w".into()).to_string(), "Bad Request: w");
    assert_eq!(HttpError::NotFound("x".into()).to_string(), "Not Found: x");
    assert_eq!(HttpError::Internal("v".into()).to_string(), "Internal Error: v");
    assert_eq!(
        HttpError::Configuration("c".into()).to_string(),
        "Configuration Error: c"
    );
    assert_eq!(
        HttpError::MethodNotAllowed { allowed: vec![Method::GET] }.to_string(),
        "Method Not Allowed (allowed: [GET])"
    );
}

#[test]
fn from_serde_json_error_is_bad_request() {
    let err: HttpError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
    assert!(matches!(err, HttpError::BadRequest(_)));
}
