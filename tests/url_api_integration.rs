//! Integration tests for the URL management API
//!
//! Covers shorten-request creation (random and custom slugs), the caller's
//! URL listing, and the ownership-guarded detail and update endpoints.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use shortify::api;
use shortify::auth::AuthService;
use shortify::storage::{SqliteStorage, Storage};
use std::sync::Arc;
use tower::ServiceExt;

async fn create_test_storage() -> Arc<dyn Storage> {
    let storage = SqliteStorage::new("sqlite::memory:", 1).await.unwrap();
    storage.init().await.unwrap();
    Arc::new(storage)
}

fn test_auth_service() -> Arc<AuthService> {
    Arc::new(AuthService::new("test-secret", 900))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, json)
}

#[tokio::test]
async fn create_url_records_the_caller_as_creator() {
    let storage = create_test_storage().await;
    let auth = test_auth_service();
    let app = api::create_api_router(Arc::clone(&storage), Arc::clone(&auth));

    let token = auth.issue_token("u1", None).unwrap();
    let (status, json) = send(
        &app,
        Method::POST,
        "/api/urls",
        Some(&token),
        Some(json!({ "longUrl": "https://example.com", "title": "Example" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["longUrl"], "https://example.com");
    assert_eq!(json["title"], "Example");
    assert_eq!(json["creatorId"], "u1");
    assert_eq!(json["disabled"], false);

    let slug = json["slug"].as_str().unwrap();
    assert!(!slug.is_empty());
    assert!(storage.find_by_slug(slug).await.unwrap().is_some());
}

#[tokio::test]
async fn create_url_without_a_token_is_anonymous() {
    let storage = create_test_storage().await;
    let auth = test_auth_service();
    let app = api::create_api_router(Arc::clone(&storage), Arc::clone(&auth));

    let (status, json) = send(
        &app,
        Method::POST,
        "/api/urls",
        None,
        Some(json!({ "longUrl": "https://example.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["creatorId"], Value::Null);
}

#[tokio::test]
async fn create_url_requires_a_long_url() {
    let storage = create_test_storage().await;
    let auth = test_auth_service();
    let app = api::create_api_router(Arc::clone(&storage), Arc::clone(&auth));

    let (status, json) = send(&app, Method::POST, "/api/urls", None, Some(json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "longUrl is required");
}

#[tokio::test]
async fn custom_slug_is_honored_and_conflicts_are_rejected() {
    let storage = create_test_storage().await;
    let auth = test_auth_service();
    let app = api::create_api_router(Arc::clone(&storage), Arc::clone(&auth));

    let (status, json) = send(
        &app,
        Method::POST,
        "/api/urls",
        None,
        Some(json!({ "longUrl": "https://example.com", "customSlug": "launch" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["slug"], "launch");

    let (status, json) = send(
        &app,
        Method::POST,
        "/api/urls",
        None,
        Some(json!({ "longUrl": "https://example.org", "customSlug": "launch" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "Slug already exists");
}

#[tokio::test]
async fn list_urls_requires_authentication_and_is_scoped_to_the_caller() {
    let storage = create_test_storage().await;
    let auth = test_auth_service();

    storage
        .create_url("mine_a", "https://example.com/a", None, None, Some("u1"))
        .await
        .unwrap();
    storage
        .create_url("mine_b", "https://example.com/b", None, None, Some("u1"))
        .await
        .unwrap();
    storage
        .create_url("theirs", "https://example.com/c", None, None, Some("u2"))
        .await
        .unwrap();

    let app = api::create_api_router(Arc::clone(&storage), Arc::clone(&auth));

    let (status, json) = send(&app, Method::GET, "/api/urls", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Authentication required");

    let token = auth.issue_token("u1", None).unwrap();
    let (status, json) = send(&app, Method::GET, "/api/urls", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    let urls = json.as_array().unwrap();
    assert_eq!(urls.len(), 2);
    assert!(urls.iter().all(|u| u["creatorId"] == "u1"));
}

#[tokio::test]
async fn url_detail_is_ownership_guarded() {
    let storage = create_test_storage().await;
    let auth = test_auth_service();

    storage
        .create_url("abc123", "https://example.com", None, None, Some("u1"))
        .await
        .unwrap();

    let app = api::create_api_router(Arc::clone(&storage), Arc::clone(&auth));

    let owner = auth.issue_token("u1", None).unwrap();
    let (status, json) = send(&app, Method::GET, "/api/urls/abc123", Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["slug"], "abc123");

    let intruder = auth.issue_token("u2", None).unwrap();
    let (status, json) = send(&app, Method::GET, "/api/urls/abc123", Some(&intruder), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"], "You do not have permission to access this URL");

    let (status, _) = send(&app, Method::GET, "/api/urls/missing", Some(&owner), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_url_disables_and_sets_expiry() {
    let storage = create_test_storage().await;
    let auth = test_auth_service();

    storage
        .create_url("abc123", "https://example.com", None, None, Some("u1"))
        .await
        .unwrap();

    let app = api::create_api_router(Arc::clone(&storage), Arc::clone(&auth));
    let token = auth.issue_token("u1", None).unwrap();

    let (status, json) = send(
        &app,
        Method::PATCH,
        "/api/urls/abc123",
        Some(&token),
        Some(json!({ "disabled": true, "expiresAt": 1709251200 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["disabled"], true);
    assert_eq!(json["expiresAt"], 1709251200);

    let url = storage.find_by_slug("abc123").await.unwrap().unwrap();
    assert!(url.disabled);

    // Only the owner may update
    let intruder = auth.issue_token("u2", None).unwrap();
    let (status, _) = send(
        &app,
        Method::PATCH,
        "/api/urls/abc123",
        Some(&intruder),
        Some(json!({ "disabled": false })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn health_check_is_open() {
    let storage = create_test_storage().await;
    let auth = test_auth_service();
    let app = api::create_api_router(Arc::clone(&storage), Arc::clone(&auth));

    let (status, json) = send(&app, Method::GET, "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "OK");
}
