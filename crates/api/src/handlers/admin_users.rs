//! Admin account management. Every route here sits behind the admin
//! role.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use glow_core::types::DbId;
use glow_db::models::admin_user::{AdminUser, CreateAdminUser, UpdateAdminUser};
use glow_db::models::role::Role;
use glow_db::repositories::{AdminUserRepo, RoleRepo, SessionRepo};

use crate::auth::password::hash_password;
use crate::error::AppError;
use crate::handlers::record_audit;
use crate::middleware::{AuthUser, RequireAdmin};
use crate::query::ListParams;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAdminRequest {
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 12, max = 128))]
    pub password: String,
    pub role: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAdminRequest {
    #[validate(length(min = 3, max = 64))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 12, max = 128))]
    pub new_password: String,
}

pub async fn list_admins(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Query(params): Query<ListParams>,
) -> Result<Json<DataResponse<Vec<AdminUser>>>, AppError> {
    let users = AdminUserRepo::list(&state.pool, params.limit(), params.offset()).await?;
    Ok(Json(DataResponse::new(users)))
}

pub async fn create_admin(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Json(req): Json<CreateAdminRequest>,
) -> Result<Json<DataResponse<AdminUser>>, AppError> {
    req.validate()?;
    let role = resolve_role(&state, &req.role).await?;
    let user = AdminUserRepo::create(
        &state.pool,
        &CreateAdminUser {
            username: req.username,
            email: req.email,
            password_hash: hash_password(&req.password)?,
            role_id: role.id,
        },
    )
    .await?;
    record_audit(
        &state,
        auth.id,
        "admin_user.create",
        "admin_user",
        Some(user.id),
        Some(json!({ "username": user.username, "role": role.name })),
    )
    .await;
    Ok(Json(DataResponse::new(user)))
}

pub async fn get_admin(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<DbId>,
) -> Result<Json<DataResponse<AdminUser>>, AppError> {
    let user = AdminUserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Admin user"))?;
    Ok(Json(DataResponse::new(user)))
}

pub async fn update_admin(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<DbId>,
    Json(req): Json<UpdateAdminRequest>,
) -> Result<Json<DataResponse<AdminUser>>, AppError> {
    req.validate()?;
    let role_id = match &req.role {
        Some(name) => Some(resolve_role(&state, name).await?.id),
        None => None,
    };
    let update = UpdateAdminUser {
        username: req.username,
        email: req.email,
        role_id,
        is_active: req.is_active,
    };
    let user = AdminUserRepo::update(&state.pool, id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("Admin user"))?;
    // Deactivation also cuts the account's refresh tokens.
    if update.is_active == Some(false) {
        SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    }
    record_audit(&state, auth.id, "admin_user.update", "admin_user", Some(id), None).await;
    Ok(Json(DataResponse::new(user)))
}

pub async fn delete_admin(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<DbId>,
) -> Result<Json<MessageResponse>, AppError> {
    if id == auth.id {
        return Err(AppError::Validation(
            "You cannot delete your own account".to_string(),
        ));
    }
    if !AdminUserRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Admin user"));
    }
    record_audit(&state, auth.id, "admin_user.delete", "admin_user", Some(id), None).await;
    Ok(Json(MessageResponse::new("Admin user deleted")))
}

/// Force-set another operator's password. Their open sessions die with it.
pub async fn reset_password(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<DbId>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    req.validate()?;
    let hash = hash_password(&req.new_password)?;
    if !AdminUserRepo::set_password_hash(&state.pool, id, &hash).await? {
        return Err(AppError::not_found("Admin user"));
    }
    SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    record_audit(
        &state,
        auth.id,
        "admin_user.reset_password",
        "admin_user",
        Some(id),
        None,
    )
    .await;
    Ok(Json(MessageResponse::new("Password reset")))
}

pub async fn list_roles(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<DataResponse<Vec<Role>>>, AppError> {
    let roles = RoleRepo::list(&state.pool).await?;
    Ok(Json(DataResponse::new(roles)))
}

async fn resolve_role(state: &AppState, name: &str) -> Result<Role, AppError> {
    RoleRepo::find_by_name(&state.pool, name)
        .await?
        .ok_or_else(|| AppError::Validation(format!("Unknown role: '{name}'")))
}
