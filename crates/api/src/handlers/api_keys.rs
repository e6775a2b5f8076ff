//! API key issuance for the consumer app surface.
//!
//! Keys are shown in full exactly once, in the issue response. After that
//! only the prefix is retrievable; the server stores a SHA-256 hash.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use glow_core::api_keys::generate_api_key;
use glow_core::types::DbId;
use glow_db::models::api_key::{ApiKey, CreateApiKey};
use glow_db::repositories::ApiKeyRepo;

use crate::error::AppError;
use crate::handlers::{profiles::find_profile, record_audit};
use crate::middleware::AuthUser;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct IssueApiKeyRequest {
    #[validate(length(min = 1, max = 100))]
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct IssuedApiKey {
    #[serde(flatten)]
    pub key: ApiKey,
    /// Full plaintext key. Returned only here, never stored.
    pub api_key: String,
}

pub async fn issue_api_key(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(profile_id): Path<DbId>,
    Json(req): Json<IssueApiKeyRequest>,
) -> Result<Json<DataResponse<IssuedApiKey>>, AppError> {
    req.validate()?;
    find_profile(&state, profile_id).await?;

    let generated = generate_api_key();
    let key = ApiKeyRepo::create(
        &state.pool,
        &CreateApiKey {
            profile_id,
            key_hash: generated.hash,
            key_prefix: generated.prefix.clone(),
            label: req.label,
        },
    )
    .await?;
    record_audit(
        &state,
        auth.id,
        "api_key.issue",
        "api_key",
        Some(key.id),
        Some(json!({ "profile_id": profile_id, "prefix": generated.prefix })),
    )
    .await;
    Ok(Json(DataResponse::new(IssuedApiKey {
        key,
        api_key: generated.plaintext,
    })))
}

pub async fn list_api_keys(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(profile_id): Path<DbId>,
) -> Result<Json<DataResponse<Vec<ApiKey>>>, AppError> {
    find_profile(&state, profile_id).await?;
    let keys = ApiKeyRepo::list_for_profile(&state.pool, profile_id).await?;
    Ok(Json(DataResponse::new(keys)))
}

/// Revocation flips `is_active`; the row stays for auditability.
pub async fn revoke_api_key(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> Result<Json<MessageResponse>, AppError> {
    if !ApiKeyRepo::deactivate(&state.pool, id).await? {
        return Err(AppError::not_found("API key"));
    }
    record_audit(&state, auth.id, "api_key.revoke", "api_key", Some(id), None).await;
    Ok(Json(MessageResponse::new("API key revoked")))
}

pub async fn delete_api_key(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> Result<Json<MessageResponse>, AppError> {
    if !ApiKeyRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("API key"));
    }
    record_audit(&state, auth.id, "api_key.delete", "api_key", Some(id), None).await;
    Ok(Json(MessageResponse::new("API key deleted")))
}
