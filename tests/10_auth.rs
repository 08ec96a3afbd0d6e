mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{register, send, test_app};

#[tokio::test]
async fn register_returns_token_and_user() {
    let app = test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/users",
        None,
        Some(json!({ "name": "Ada", "email": "ada@example.com", "password": "password123" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["data"]["user"]["name"], "Ada");
    assert_eq!(body["data"]["user"]["email"], "ada@example.com");
    // The credential hash must never leave the service layer.
    assert!(body["data"]["user"].get("password").is_none());
    assert!(body["data"]["user"]["avatar"]
        .as_str()
        .is_some_and(|a| a.contains("gravatar")));
}

#[tokio::test]
async fn register_rejects_invalid_input_with_field_errors() {
    let app = test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/users",
        None,
        Some(json!({ "name": "A", "email": "not-an-email", "password": "short" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], true);
    let errors = body["field_errors"].as_object().expect("field errors");
    assert!(errors.contains_key("name"));
    assert!(errors.contains_key("email"));
    assert!(errors.contains_key("password"));
}

#[tokio::test]
async fn register_duplicate_email_conflicts() {
    let app = test_app();
    register(&app, "Ada", "ada@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/users",
        None,
        Some(json!({ "name": "Ada Again", "email": "ada@example.com", "password": "password123" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["message"],
        "A user is already registered with this email."
    );
}

#[tokio::test]
async fn register_treats_email_case_insensitively() {
    let app = test_app();
    register(&app, "Ada", "ada@example.com").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/users",
        None,
        Some(json!({ "name": "Ada", "email": "ADA@Example.com", "password": "password123" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_roundtrip() {
    let app = test_app();
    register(&app, "Ada", "ada@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth",
        None,
        Some(json!({ "email": "ada@example.com", "password": "password123" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["data"]["user"]["email"], "ada@example.com");
}

#[tokio::test]
async fn login_rejects_wrong_password_and_unknown_email_alike() {
    let app = test_app();
    register(&app, "Ada", "ada@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth",
        None,
        Some(json!({ "email": "ada@example.com", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password.");

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password.");
}

#[tokio::test]
async fn current_user_requires_a_valid_token() {
    let app = test_app();
    let token = register(&app, "Ada", "ada@example.com").await;

    let (status, _) = send(&app, "GET", "/api/auth", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/auth", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, "GET", "/api/auth", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "ada@example.com");
    assert!(body["data"].get("password").is_none());
}

#[tokio::test]
async fn health_and_root_respond() {
    let app = test_app();

    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = send(&app, "GET", "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["name"].as_str().is_some());
}
