use serde::Serialize;
use sqlx::FromRow;

use glow_core::types::{DbId, Timestamp};

/// Matches the append-only `audit_log` table. `admin_user_id` is NULL
/// once the operator account has been deleted.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditEntry {
    pub id: DbId,
    pub admin_user_id: Option<DbId>,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<DbId>,
    pub detail: Option<serde_json::Value>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateAuditEntry {
    pub admin_user_id: Option<DbId>,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<DbId>,
    pub detail: Option<serde_json::Value>,
}
