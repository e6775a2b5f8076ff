//! Route definitions for the `/audit` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::audit;
use crate::state::AppState;

/// Routes mounted at `/audit` (admin only).
///
/// ```text
/// GET / -> list_audit_entries (?admin_user_id&limit&offset)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(audit::list_audit_entries))
}
