//! Route definitions for the `/goals` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::goals;
use crate::state::AppState;

/// Routes mounted at `/goals`. Creation lives under
/// `/profiles/{id}/goals`.
///
/// ```text
/// GET    /{id}          -> get_goal
/// PUT    /{id}          -> update_goal
/// DELETE /{id}          -> delete_goal
/// POST   /{id}/achieve  -> achieve_goal
/// POST   /{id}/abandon  -> abandon_goal
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(goals::get_goal)
                .put(goals::update_goal)
                .delete(goals::delete_goal),
        )
        .route("/{id}/achieve", post(goals::achieve_goal))
        .route("/{id}/abandon", post(goals::abandon_goal))
}
