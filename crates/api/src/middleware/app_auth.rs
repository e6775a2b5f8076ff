//! API-key extractor for the subscriber companion app.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use glow_core::api_keys::hash_api_key;
use glow_core::types::DbId;
use glow_db::models::profile::Profile;
use glow_db::repositories::{ApiKeyRepo, ProfileRepo};

use crate::error::AppError;
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// The subscriber a companion-app request acts on behalf of, resolved
/// from the `x-api-key` header. Inactive keys and inactive profiles are
/// both rejected without distinguishing which failed.
#[derive(Debug, Clone)]
pub struct AppProfile {
    pub profile: Profile,
    pub api_key_id: DbId,
}

impl FromRequestParts<AppState> for AppProfile {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let key = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing API key".to_string()))?;

        let invalid = || AppError::Unauthorized("Invalid API key".to_string());
        let api_key = ApiKeyRepo::find_active_by_hash(&state.pool, &hash_api_key(key))
            .await?
            .ok_or_else(invalid)?;
        let profile = ProfileRepo::find_by_id(&state.pool, api_key.profile_id)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(invalid)?;

        if let Err(e) = ApiKeyRepo::touch_last_used(&state.pool, api_key.id).await {
            tracing::warn!(error = %e, api_key_id = api_key.id, "failed to stamp key usage");
        }

        Ok(AppProfile {
            profile,
            api_key_id: api_key.id,
        })
    }
}
