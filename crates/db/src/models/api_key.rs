use serde::Serialize;
use sqlx::FromRow;

use glow_core::types::{DbId, Timestamp};

/// Matches the `api_keys` table. The hash is write-only from the API's
/// point of view; listings expose only the prefix.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApiKey {
    pub id: DbId,
    pub profile_id: DbId,
    #[serde(skip_serializing)]
    pub key_hash: String,
    pub key_prefix: String,
    pub label: String,
    pub is_active: bool,
    pub last_used_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateApiKey {
    pub profile_id: DbId,
    pub key_hash: String,
    pub key_prefix: String,
    pub label: String,
}
