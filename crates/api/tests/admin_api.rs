//! Integration tests for operator account management and role gating.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get_auth, login_as, post_json, post_json_auth, put_json_auth};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Test: admin can create and list operator accounts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_creates_and_lists_operators(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = login_as(&pool, app.clone(), "root", "admin").await;

    let body = json!({
        "username": "newcoach",
        "email": "newcoach@glow.test",
        "password": "a-long-enough-password",
        "role": "coach",
    });
    let response = post_json_auth(app.clone(), "/api/v1/admin/users", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let created = body_json(response).await;
    assert_eq!(created["data"]["username"], "newcoach");
    assert!(created["data"].get("password_hash").is_none());

    let response = get_auth(app, "/api/v1/admin/users", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    let usernames: Vec<&str> = listed["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert!(usernames.contains(&"root"));
    assert!(usernames.contains(&"newcoach"));
}

// ---------------------------------------------------------------------------
// Test: the coach role cannot manage operator accounts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn coach_cannot_manage_operators(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = login_as(&pool, app.clone(), "helper", "coach").await;

    let response = get_auth(app.clone(), "/api/v1/admin/users", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["code"], "FORBIDDEN");

    let body = json!({
        "username": "sneaky",
        "email": "sneaky@glow.test",
        "password": "a-long-enough-password",
        "role": "admin",
    });
    let response = post_json_auth(app, "/api/v1/admin/users", body, &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Test: duplicate usernames are a conflict, not a 500
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_username_is_a_conflict(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = login_as(&pool, app.clone(), "root", "admin").await;

    let body = json!({
        "username": "root",
        "email": "other@glow.test",
        "password": "a-long-enough-password",
        "role": "coach",
    });
    let response = post_json_auth(app, "/api/v1/admin/users", body, &token).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_role_is_a_validation_error(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = login_as(&pool, app.clone(), "root", "admin").await;

    let body = json!({
        "username": "withbadrole",
        "email": "withbadrole@glow.test",
        "password": "a-long-enough-password",
        "role": "superuser",
    });
    let response = post_json_auth(app, "/api/v1/admin/users", body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: update and delete round trip
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_updates_and_deletes_operator(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = login_as(&pool, app.clone(), "root", "admin").await;
    let target = common::create_operator(&pool, "target", "coach").await;

    let body = json!({ "email": "renamed@glow.test" });
    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/admin/users/{}", target.id),
        body,
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["data"]["email"], "renamed@glow.test");

    let response = delete_auth(
        app.clone(),
        &format!("/api/v1/admin/users/{}", target.id),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(
        app,
        &format!("/api/v1/admin/users/{}", target.id),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: deactivating an operator revokes their sessions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn deactivation_revokes_sessions(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let admin_token = login_as(&pool, app.clone(), "root", "admin").await;
    let target = common::create_operator(&pool, "target", "coach").await;
    let target_session = common::login(app.clone(), "target").await;
    let target_refresh = target_session["refresh_token"].as_str().unwrap().to_string();

    let body = json!({ "is_active": false });
    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/admin/users/{}", target.id),
        body,
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let refresh = post_json(
        app,
        "/api/v1/auth/refresh",
        json!({ "refresh_token": target_refresh }),
    )
    .await;
    assert_eq!(refresh.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: password reset cuts old credentials over to the new ones
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn password_reset_rotates_credentials(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let admin_token = login_as(&pool, app.clone(), "root", "admin").await;
    let target = common::create_operator(&pool, "target", "coach").await;
    let target_session = common::login(app.clone(), "target").await;
    let target_refresh = target_session["refresh_token"].as_str().unwrap().to_string();

    let body = json!({ "new_password": "a-reset-password-123" });
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/admin/users/{}/reset-password", target.id),
        body,
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The target's outstanding refresh token is dead.
    let refresh = post_json(
        app.clone(),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": target_refresh }),
    )
    .await;
    assert_eq!(refresh.status(), StatusCode::UNAUTHORIZED);

    // Old password rejected, new password accepted.
    let old = post_json(
        app.clone(),
        "/api/v1/auth/login",
        json!({ "username": "target", "password": common::TEST_PASSWORD }),
    )
    .await;
    assert_eq!(old.status(), StatusCode::UNAUTHORIZED);

    let new = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "username": "target", "password": "a-reset-password-123" }),
    )
    .await;
    assert_eq!(new.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Test: the seeded roles are listable by any operator
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn roles_are_listable(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = login_as(&pool, app.clone(), "helper", "coach").await;

    let response = get_auth(app, "/api/v1/roles", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"admin"));
    assert!(names.contains(&"coach"));
}
