#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use devconnect_api::app::app;
use devconnect_api::config::AppConfig;
use devconnect_api::state::AppState;
use devconnect_api::store::memory::MemoryStore;

/// Build the full router on a fresh in-memory store. Each call is an
/// isolated world; suites share nothing.
pub fn test_app() -> Router {
    let mut config = AppConfig::development();
    config.security.jwt_secret = "integration-test-secret".to_string();

    let state = AppState::new(Arc::new(config), Arc::new(MemoryStore::new()));
    app(state)
}

/// Drive one request through the router in-process and read the JSON body.
pub async fn send(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}

/// Register a user and return their bearer token.
pub async fn register(app: &Router, name: &str, email: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/users",
        None,
        Some(json!({ "name": name, "email": email, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "registration failed: {}", body);
    body["data"]["token"].as_str().expect("token").to_string()
}

/// Register a user and return (token, user id).
pub async fn register_with_id(app: &Router, name: &str, email: &str) -> (String, String) {
    let (status, body) = send(
        app,
        "POST",
        "/api/users",
        None,
        Some(json!({ "name": name, "email": email, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "registration failed: {}", body);
    (
        body["data"]["token"].as_str().expect("token").to_string(),
        body["data"]["user"]["id"].as_str().expect("user id").to_string(),
    )
}

/// Create a profile for the token's user with the given skills string.
pub async fn create_profile(app: &Router, token: &str, skills: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/api/profile",
        Some(token),
        Some(json!({ "status": "Developer", "skills": skills })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "profile upsert failed: {}", body);
    body["data"].clone()
}

/// Create a post and return its id.
pub async fn create_post(app: &Router, token: &str, text: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/posts",
        Some(token),
        Some(json!({ "text": text })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "post creation failed: {}", body);
    body["data"]["id"].as_str().expect("post id").to_string()
}
