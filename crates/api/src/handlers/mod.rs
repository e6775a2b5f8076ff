//! Request handlers, one module per resource.

pub mod admin_users;
pub mod api_keys;
pub mod app;
pub mod audit;
pub mod auth;
pub mod completions;
pub mod goals;
pub mod photos;
pub mod profiles;
pub mod routines;
pub mod surveys;

use glow_core::types::DbId;
use glow_db::models::audit::CreateAuditEntry;
use glow_db::repositories::AuditRepo;

use crate::state::AppState;

/// Append an audit entry for a console mutation. Failures are logged and
/// swallowed; the mutation itself has already committed.
pub(crate) async fn record_audit(
    state: &AppState,
    admin_user_id: DbId,
    action: &str,
    entity_type: &str,
    entity_id: Option<DbId>,
    detail: Option<serde_json::Value>,
) {
    let entry = CreateAuditEntry {
        admin_user_id: Some(admin_user_id),
        action: action.to_string(),
        entity_type: Some(entity_type.to_string()),
        entity_id,
        detail,
    };
    if let Err(e) = AuditRepo::create(&state.pool, &entry).await {
        tracing::warn!(error = %e, action, "audit write failed");
    }
}
