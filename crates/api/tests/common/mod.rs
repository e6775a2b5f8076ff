//! Shared harness for HTTP-level integration tests.
//!
//! Uses Axum's tower::ServiceExt to send requests directly to the router
//! without an actual TCP listener, so every test exercises the same
//! middleware stack production uses.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use glow_api::auth::password::hash_password;
use glow_api::config::ServerConfig;
use glow_api::router::build_app_router;
use glow_api::state::AppState;
use glow_db::models::admin_user::{AdminUser, CreateAdminUser};
use glow_db::models::profile::{CreateProfile, Profile};
use glow_db::repositories::{AdminUserRepo, ProfileRepo, RoleRepo};

pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Build a test `ServerConfig` with safe defaults. The database URL is
/// unused because the pool comes from `#[sqlx::test]`.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        database_url: String::new(),
        db_max_connections: 5,
        jwt_secret: "integration-test-secret".to_string(),
        access_token_minutes: 15,
        refresh_token_days: 30,
        media_root: std::env::temp_dir().join(format!("glow-media-{}", uuid::Uuid::new_v4())),
        cors_origins: vec!["http://localhost:5173".to_string()],
        seeder_interval_secs: 3600,
        sweep_interval_secs: 3600,
        request_timeout_secs: 30,
    }
}

/// Build the full application router with all middleware layers, using
/// the given database pool. Background tasks are not started.
pub fn build_test_app(pool: PgPool) -> Router {
    let state = AppState::new(pool, test_config());
    build_app_router(state.clone(), &state.config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, &[]).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, None, &[bearer(token)]).await
}

pub async fn get_app(app: Router, uri: &str, api_key: &str) -> Response {
    send(app, Method::GET, uri, None, &[("x-api-key".into(), api_key.to_string())]).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, Method::POST, uri, Some(body), &[]).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, Method::POST, uri, Some(body), &[bearer(token)]).await
}

pub async fn post_json_app(app: Router, uri: &str, body: Value, api_key: &str) -> Response {
    send(
        app,
        Method::POST,
        uri,
        Some(body),
        &[("x-api-key".into(), api_key.to_string())],
    )
    .await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, Method::PUT, uri, Some(body), &[bearer(token)]).await
}

pub async fn patch_json_app(app: Router, uri: &str, body: Value, api_key: &str) -> Response {
    send(
        app,
        Method::PATCH,
        uri,
        Some(body),
        &[("x-api-key".into(), api_key.to_string())],
    )
    .await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, None, &[bearer(token)]).await
}

/// Decode a response body as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

fn bearer(token: &str) -> (String, String) {
    (
        header::AUTHORIZATION.to_string(),
        format!("Bearer {token}"),
    )
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    headers: &[(String, String)],
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(name, value);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");
    app.oneshot(request).await.expect("request should complete")
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

/// Create an operator account directly in the database. `role` is the
/// seeded role name ('admin' or 'coach'); the password is [`TEST_PASSWORD`].
pub async fn create_operator(pool: &PgPool, username: &str, role: &str) -> AdminUser {
    let role = RoleRepo::find_by_name(pool, role)
        .await
        .expect("role lookup should succeed")
        .expect("seeded role should exist");
    AdminUserRepo::create(
        pool,
        &CreateAdminUser {
            username: username.to_string(),
            email: format!("{username}@glow.test"),
            password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
            role_id: role.id,
        },
    )
    .await
    .expect("operator creation should succeed")
}

/// Log in through the API and return the `data` object with tokens.
pub async fn login(app: Router, username: &str) -> Value {
    let body = serde_json::json!({ "username": username, "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"].clone()
}

/// Create an operator and return a ready-to-use access token.
pub async fn login_as(pool: &PgPool, app: Router, username: &str, role: &str) -> String {
    create_operator(pool, username, role).await;
    login(app, username).await["access_token"]
        .as_str()
        .expect("login should return access_token")
        .to_string()
}

/// Seed a subscriber profile in a known timezone.
pub async fn create_test_profile(pool: &PgPool, email: &str, timezone: &str) -> Profile {
    ProfileRepo::create(
        pool,
        &CreateProfile {
            email: email.to_string(),
            first_name: "Test".to_string(),
            last_name: "Subscriber".to_string(),
            timezone: Some(timezone.to_string()),
            skin_type: None,
            birth_date: None,
            notes: None,
        },
    )
    .await
    .expect("profile creation should succeed")
}
