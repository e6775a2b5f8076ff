//! Route definitions for the `/api-keys` resource.

use axum::routing::{delete, post};
use axum::Router;

use crate::handlers::api_keys;
use crate::state::AppState;

/// Routes mounted at `/api-keys`. Issuance and listing live under
/// `/profiles/{id}/api-keys`.
///
/// ```text
/// POST   /{id}/revoke  -> revoke_api_key (deactivate, row kept)
/// DELETE /{id}         -> delete_api_key (hard delete)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/revoke", post(api_keys::revoke_api_key))
        .route("/{id}", delete(api_keys::delete_api_key))
}
