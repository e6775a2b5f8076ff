use sqlx::PgPool;

use crate::models::audit::{AuditEntry, CreateAuditEntry};
use glow_core::types::DbId;

const COLUMNS: &str =
    "id, admin_user_id, action, entity_type, entity_id, detail, created_at";

pub struct AuditRepo;

impl AuditRepo {
    pub async fn create(
        pool: &PgPool,
        data: &CreateAuditEntry,
    ) -> Result<AuditEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_log (admin_user_id, action, entity_type, entity_id, detail) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditEntry>(&query)
            .bind(data.admin_user_id)
            .bind(&data.action)
            .bind(&data.entity_type)
            .bind(data.entity_id)
            .bind(&data.detail)
            .fetch_one(pool)
            .await
    }

    /// Newest first, optionally narrowed to one operator.
    pub async fn list(
        pool: &PgPool,
        admin_user_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_log \
             WHERE $1::bigint IS NULL OR admin_user_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, AuditEntry>(&query)
            .bind(admin_user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
