//! Console login, token refresh, and password management.

use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use glow_db::models::admin_user::AdminUser;
use glow_db::repositories::admin_user_repo::is_locked;
use glow_db::repositories::{AdminUserRepo, RoleRepo, SessionRepo};

use crate::auth::jwt::issue_access_token;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::refresh::{generate_refresh_token, hash_refresh_token};
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

/// Failed attempts tolerated before a temporary lockout.
pub const MAX_FAILED_LOGINS: i32 = 5;
/// Lockout duration once the attempt budget is exhausted.
pub const LOCK_MINUTES: i64 = 15;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub user: AdminUser,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    #[validate(length(min = 12, max = 128))]
    pub new_password: String,
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".to_string())
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<DataResponse<SessionTokens>>, AppError> {
    let user = AdminUserRepo::find_by_username(&state.pool, &req.username)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(invalid_credentials)?;

    let now = Utc::now();
    if is_locked(&user, now) {
        return Err(AppError::Unauthorized(
            "Account temporarily locked after repeated failures".to_string(),
        ));
    }
    if !verify_password(&req.password, &user.password_hash) {
        let lock_until = now + Duration::minutes(LOCK_MINUTES);
        AdminUserRepo::record_login_failure(&state.pool, user.id, MAX_FAILED_LOGINS, lock_until)
            .await?;
        return Err(invalid_credentials());
    }

    AdminUserRepo::record_login_success(&state.pool, user.id).await?;
    let tokens = issue_session(&state, user).await?;
    tracing::info!(user_id = tokens.user.id, "console login");
    Ok(Json(DataResponse::new(tokens)))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<DataResponse<SessionTokens>>, AppError> {
    let invalid = || AppError::Unauthorized("Invalid refresh token".to_string());
    let session = SessionRepo::find_by_token_hash(&state.pool, &hash_refresh_token(&req.refresh_token))
        .await?
        .ok_or_else(invalid)?;
    let now = Utc::now();
    if session.revoked_at.is_some() || session.expires_at <= now {
        return Err(invalid());
    }
    let user = AdminUserRepo::find_by_id(&state.pool, session.admin_user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(invalid)?;

    // Rotation: the presented token dies with this exchange.
    SessionRepo::revoke(&state.pool, session.id).await?;
    let tokens = issue_session(&state, user).await?;
    Ok(Json(DataResponse::new(tokens)))
}

pub async fn logout(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    if let Some(session) =
        SessionRepo::find_by_token_hash(&state.pool, &hash_refresh_token(&req.refresh_token))
            .await?
    {
        SessionRepo::revoke(&state.pool, session.id).await?;
    }
    // Same answer whether or not the token matched.
    Ok(Json(MessageResponse::new("Logged out")))
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: AdminUser,
    pub role: String,
}

pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<DataResponse<MeResponse>>, AppError> {
    let user = AdminUserRepo::find_by_id(&state.pool, auth.id)
        .await?
        .ok_or_else(|| AppError::not_found("Admin user"))?;
    Ok(Json(DataResponse::new(MeResponse {
        user,
        role: auth.role,
    })))
}

pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    req.validate()?;
    let user = AdminUserRepo::find_by_id(&state.pool, auth.id)
        .await?
        .ok_or_else(|| AppError::not_found("Admin user"))?;
    if !verify_password(&req.current_password, &user.password_hash) {
        return Err(AppError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }
    let new_hash = hash_password(&req.new_password)?;
    AdminUserRepo::set_password_hash(&state.pool, user.id, &new_hash).await?;
    // Every outstanding session has to log in again.
    SessionRepo::revoke_all_for_user(&state.pool, user.id).await?;
    Ok(Json(MessageResponse::new("Password changed")))
}

async fn issue_session(state: &AppState, user: AdminUser) -> Result<SessionTokens, AppError> {
    let role = RoleRepo::find_by_id(&state.pool, user.role_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("role {} missing", user.role_id)))?;
    let now = Utc::now();
    let access_token = issue_access_token(
        &state.config.jwt_secret,
        user.id,
        &user.username,
        &role.name,
        state.config.access_token_minutes,
        now,
    )?;
    let refresh_token = generate_refresh_token();
    SessionRepo::create(
        &state.pool,
        user.id,
        &hash_refresh_token(&refresh_token),
        now + Duration::days(state.config.refresh_token_days),
    )
    .await?;
    Ok(SessionTokens {
        access_token,
        refresh_token,
        role: role.name,
        user,
    })
}
