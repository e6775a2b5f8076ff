//! Bearer-token extractor for console endpoints.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use glow_core::roles::ROLE_ADMIN;
use glow_core::types::DbId;

use crate::auth::jwt::decode_access_token;
use crate::error::AppError;
use crate::state::AppState;

/// The authenticated console operator, decoded from the access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: DbId,
    pub username: String,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;
        let claims = decode_access_token(&state.config.jwt_secret, token)?;
        Ok(AuthUser {
            id: claims.sub,
            username: claims.username,
            role: claims.role,
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
