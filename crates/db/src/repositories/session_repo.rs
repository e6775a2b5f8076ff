use sqlx::PgPool;

use crate::models::admin_user::AdminSession;
use glow_core::types::{DbId, Timestamp};

const COLUMNS: &str =
    "id, admin_user_id, refresh_token_hash, expires_at, revoked_at, created_at";

pub struct SessionRepo;

impl SessionRepo {
    pub async fn create(
        pool: &PgPool,
        admin_user_id: DbId,
        refresh_token_hash: &str,
        expires_at: Timestamp,
    ) -> Result<AdminSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO admin_sessions (admin_user_id, refresh_token_hash, expires_at) \
             VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AdminSession>(&query)
            .bind(admin_user_id)
            .bind(refresh_token_hash)
            .bind(expires_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_token_hash(
        pool: &PgPool,
        refresh_token_hash: &str,
    ) -> Result<Option<AdminSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM admin_sessions WHERE refresh_token_hash = $1"
        );
        sqlx::query_as::<_, AdminSession>(&query)
            .bind(refresh_token_hash)
            .fetch_optional(pool)
            .await
    }

    pub async fn revoke(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE admin_sessions SET revoked_at = NOW() WHERE id = $1 AND revoked_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn revoke_all_for_user(
        pool: &PgPool,
        admin_user_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE admin_sessions SET revoked_at = NOW() \
             WHERE admin_user_id = $1 AND revoked_at IS NULL",
        )
        .bind(admin_user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Drop sessions whose expiry is past. Run by the retention task.
    pub async fn delete_expired(pool: &PgPool, now: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM admin_sessions WHERE expires_at < $1")
            .bind(now)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
