//! Order cancellation and email dispatch failure paths.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use group_order_integration_tests::{TestApp, body_json, json_request, raw_request};

#[tokio::test]
async fn test_cancel_rejects_malformed_body() {
    let app = TestApp::new();

    let response = app
        .router
        .oneshot(raw_request(
            "POST",
            "/api/orders/ord-1/cancel",
            "application/json",
            "{reason",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().starts_with("Bad request"));
}

#[tokio::test]
async fn test_send_email_rejects_invalid_recipient() {
    let app = TestApp::new();

    let response = app
        .router
        .oneshot(json_request(
            "POST",
            "/api/send-email",
            &json!({ "to": "nobody", "subject": "Hi", "text": "Hello" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Invalid email address: nobody" })
    );
}

#[tokio::test]
async fn test_send_email_requires_a_body() {
    let app = TestApp::new();

    let response = app
        .router
        .oneshot(json_request(
            "POST",
            "/api/send-email",
            &json!({ "to": "diner@lunch.test", "subject": "Hi" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Message has no body" })
    );
}

#[tokio::test]
async fn test_send_email_requires_recipient() {
    let app = TestApp::new();

    let response = app
        .router
        .oneshot(json_request(
            "POST",
            "/api/send-email",
            &json!({ "subject": "Hi", "text": "x" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid email request: `to` is required");
}

#[tokio::test]
async fn test_send_email_rejects_malformed_body() {
    let app = TestApp::new();

    let response = app
        .router
        .oneshot(raw_request(
            "POST",
            "/api/send-email",
            "application/json",
            "{\"to\": ",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid email request")
    );
}
