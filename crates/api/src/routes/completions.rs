//! Route definitions for the `/completions` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::completions;
use crate::state::AppState;

/// Routes mounted at `/completions`. Listings and generation live under
/// `/profiles/{id}/...`.
///
/// ```text
/// POST /{id}/complete  -> complete_step
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/complete", post(completions::complete_step))
}
