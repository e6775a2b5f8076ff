use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use glow_core::types::{DbId, Timestamp};

/// Matches the `admin_users` table. The password hash never leaves the
/// backend.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdminUser {
    pub id: DbId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role_id: DbId,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    #[serde(skip_serializing)]
    pub failed_login_count: i32,
    #[serde(skip_serializing)]
    pub locked_until: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert payload. The hash is produced by the API layer; plaintext
/// passwords never reach this crate.
#[derive(Debug, Clone)]
pub struct CreateAdminUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: DbId,
}

/// Patch payload; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAdminUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role_id: Option<DbId>,
    pub is_active: Option<bool>,
}

/// Matches the `admin_sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct AdminSession {
    pub id: DbId,
    pub admin_user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
