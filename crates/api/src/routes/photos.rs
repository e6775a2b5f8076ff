//! Route definitions for the `/photos` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::photos;
use crate::state::AppState;

/// Routes mounted at `/photos`. Listing and upload live under
/// `/profiles/{id}/photos`.
///
/// ```text
/// GET    /{id}/file  -> serve_photo (raw bytes)
/// DELETE /{id}       -> delete_photo (row + stored file)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/file", get(photos::serve_photo))
        .route("/{id}", delete(photos::delete_photo))
}
