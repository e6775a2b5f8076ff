use sqlx::PgPool;

use crate::models::api_key::{ApiKey, CreateApiKey};
use glow_core::types::DbId;

const COLUMNS: &str = "id, profile_id, key_hash, key_prefix, label, is_active, \
     last_used_at, created_at, updated_at";

pub struct ApiKeyRepo;

impl ApiKeyRepo {
    pub async fn create(pool: &PgPool, data: &CreateApiKey) -> Result<ApiKey, sqlx::Error> {
        let query = format!(
            "INSERT INTO api_keys (profile_id, key_hash, key_prefix, label) \
             VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ApiKey>(&query)
            .bind(data.profile_id)
            .bind(&data.key_hash)
            .bind(&data.key_prefix)
            .bind(&data.label)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ApiKey>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM api_keys WHERE id = $1");
        sqlx::query_as::<_, ApiKey>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lookup for request authentication; inactive keys never match.
    pub async fn find_active_by_hash(
        pool: &PgPool,
        key_hash: &str,
    ) -> Result<Option<ApiKey>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM api_keys WHERE key_hash = $1 AND is_active"
        );
        sqlx::query_as::<_, ApiKey>(&query)
            .bind(key_hash)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_profile(
        pool: &PgPool,
        profile_id: DbId,
    ) -> Result<Vec<ApiKey>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM api_keys WHERE profile_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, ApiKey>(&query)
            .bind(profile_id)
            .fetch_all(pool)
            .await
    }

    /// Best-effort usage stamp; auth does not depend on it succeeding.
    pub async fn touch_last_used(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE api_keys SET last_used_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map(|_| ())
    }

    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE api_keys SET is_active = FALSE WHERE id = $1 AND is_active",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM api_keys WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
