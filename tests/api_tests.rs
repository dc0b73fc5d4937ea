//! Completion proxy endpoint tests.

use axum::{
    body::Body,
    http::{ Method, Request, StatusCode, header },
};
use serde_json::{ Value, json };
use tower::ServiceExt;

mod common;
use common::{ test_app, FakeModel };

async fn call(app: axum::Router, method: Method, body: Body) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/chat")
                .method(method)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

fn json_body(value: Value) -> Body {
    Body::from(serde_json::to_string(&value).unwrap())
}

#[tokio::test]
async fn test_post_returns_model_reply() {
    let model = FakeModel::replying("Use **smart pointers**.");
    let (status, json) = call(
        test_app(model.clone()),
        Method::POST,
        json_body(json!({
            "messages": [
                { "role": "assistant", "content": "Hello!" },
                { "role": "user", "content": "How do I avoid leaks in C++?" }
            ]
        })),
    ).await;

    assert_eq!(status, StatusCode::OK);
    // the proxy does not sanitize; the client does
    assert_eq!(json, json!({ "content": "Use **smart pointers**." }));
}

#[tokio::test]
async fn test_only_last_message_is_forwarded_in_template() {
    let model = FakeModel::replying("ok");
    call(
        test_app(model.clone()),
        Method::POST,
        json_body(json!({
            "messages": [
                { "role": "user", "content": "earlier question" },
                { "role": "assistant", "content": "earlier answer" },
                { "role": "user", "content": "What is a JVM?" }
            ]
        })),
    ).await;

    assert_eq!(model.prompts(), vec!["[Java/C++ tutor] What is a JVM?".to_string()]);
}

#[tokio::test]
async fn test_non_array_messages_is_bad_request() {
    let model = FakeModel::replying("unused");
    let (status, json) = call(
        test_app(model.clone()),
        Method::POST,
        json_body(json!({ "messages": "not-an-array" })),
    ).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({ "error": "Invalid request body" }));
    assert!(model.prompts().is_empty());
}

#[tokio::test]
async fn test_missing_messages_is_bad_request() {
    let (status, json) = call(
        test_app(FakeModel::replying("unused")),
        Method::POST,
        json_body(json!({ "history": [] })),
    ).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({ "error": "Invalid request body" }));
}

#[tokio::test]
async fn test_remote_failure_is_internal_error_with_details() {
    let (status, json) = call(
        test_app(FakeModel::failing("quota exceeded")),
        Method::POST,
        json_body(json!({ "messages": [{ "role": "user", "content": "hi" }] })),
    ).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Internal server error");
    assert_eq!(json["details"], "quota exceeded");
}

#[tokio::test]
async fn test_unparseable_body_is_internal_error() {
    let (status, json) = call(
        test_app(FakeModel::replying("unused")),
        Method::POST,
        Body::from("{not json"),
    ).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Internal server error");
    assert!(json["details"].is_string());
}

#[tokio::test]
async fn test_empty_history_is_internal_error() {
    let model = FakeModel::replying("unused");
    let (status, json) = call(
        test_app(model.clone()),
        Method::POST,
        json_body(json!({ "messages": [] })),
    ).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["details"], "messages must not be empty");
    assert!(model.prompts().is_empty());
}

#[tokio::test]
async fn test_unknown_role_is_internal_error() {
    let (status, json) = call(
        test_app(FakeModel::replying("unused")),
        Method::POST,
        json_body(json!({ "messages": [{ "role": "system", "content": "x" }] })),
    ).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Internal server error");
}

#[tokio::test]
async fn test_get_is_method_not_allowed() {
    let (status, json) = call(test_app(FakeModel::replying("unused")), Method::GET, Body::empty()).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(json, json!({ "error": "GET method not allowed" }));
}

#[tokio::test]
async fn test_other_methods_are_not_allowed() {
    for method in [Method::PUT, Method::DELETE, Method::PATCH] {
        let expected = format!("{} method not allowed", method);
        let (status, json) = call(test_app(FakeModel::replying("unused")), method, Body::empty()).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(json["error"], expected);
    }
}

#[tokio::test]
async fn test_plain_options_is_method_not_allowed() {
    let (status, json) = call(test_app(FakeModel::replying("unused")), Method::OPTIONS, Body::empty()).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(json, json!({ "error": "OPTIONS method not allowed" }));
}

#[tokio::test]
async fn test_options_with_origin_only_is_method_not_allowed() {
    let response = test_app(FakeModel::replying("unused"))
        .oneshot(
            Request::builder()
                .uri("/api/chat")
                .method(Method::OPTIONS)
                .header(header::ORIGIN, "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "OPTIONS method not allowed");
}

#[tokio::test]
async fn test_cors_preflight_is_answered() {
    let model = FakeModel::replying("unused");
    let response = test_app(model.clone())
        .oneshot(
            Request::builder()
                .uri("/api/chat")
                .method(Method::OPTIONS)
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    assert!(response.headers().contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
    assert!(model.prompts().is_empty());
}

#[tokio::test]
async fn test_oversized_body_is_internal_error_with_json() {
    let model = FakeModel::replying("unused");
    let content = "x".repeat(3 * 1024 * 1024);
    let (status, json) = call(
        test_app(model.clone()),
        Method::POST,
        json_body(json!({ "messages": [{ "role": "user", "content": content }] })),
    ).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Internal server error");
    assert!(json["details"].is_string());
    assert!(model.prompts().is_empty());
}
