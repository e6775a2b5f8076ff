//! Route definitions for the `/admin` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::admin_users;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /users                     -> list_admins
/// POST   /users                     -> create_admin
/// GET    /users/{id}                -> get_admin
/// PUT    /users/{id}                -> update_admin
/// DELETE /users/{id}                -> delete_admin
/// POST   /users/{id}/reset-password -> reset_password
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(admin_users::list_admins).post(admin_users::create_admin),
        )
        .route(
            "/users/{id}",
            get(admin_users::get_admin)
                .put(admin_users::update_admin)
                .delete(admin_users::delete_admin),
        )
        .route(
            "/users/{id}/reset-password",
            post(admin_users::reset_password),
        )
}
