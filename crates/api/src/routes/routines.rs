//! Route definitions for the `/routines` resource.
//!
//! Routine creation lives under `/profiles/{id}/routines`; this router
//! covers everything addressed by routine id.

use axum::routing::get;
use axum::Router;

use crate::handlers::routines;
use crate::state::AppState;

/// Routes mounted at `/routines`.
///
/// ```text
/// GET    /{id}                         -> get_routine (with products)
/// PUT    /{id}                         -> update_routine
/// DELETE /{id}                         -> delete_routine
/// GET    /{routine_id}/products        -> list_products
/// POST   /{routine_id}/products        -> create_product
/// PUT    /{routine_id}/products/{id}   -> update_product
/// DELETE /{routine_id}/products/{id}   -> delete_product
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(routines::get_routine)
                .put(routines::update_routine)
                .delete(routines::delete_routine),
        )
        .route(
            "/{routine_id}/products",
            get(routines::list_products).post(routines::create_product),
        )
        .route(
            "/{routine_id}/products/{id}",
            axum::routing::put(routines::update_product).delete(routines::delete_product),
        )
}
