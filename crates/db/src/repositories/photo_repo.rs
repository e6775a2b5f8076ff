use sqlx::PgPool;

use crate::models::photo::{CreateProgressPhoto, ProgressPhoto};
use glow_core::types::DbId;

const COLUMNS: &str = "id, profile_id, file_path, content_type, file_size_bytes, \
     width, height, caption, taken_on, created_at";

pub struct PhotoRepo;

impl PhotoRepo {
    pub async fn create(
        pool: &PgPool,
        data: &CreateProgressPhoto,
    ) -> Result<ProgressPhoto, sqlx::Error> {
        let query = format!(
            "INSERT INTO progress_photos \
                (profile_id, file_path, content_type, file_size_bytes, width, height, \
                 caption, taken_on) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProgressPhoto>(&query)
            .bind(data.profile_id)
            .bind(&data.file_path)
            .bind(&data.content_type)
            .bind(data.file_size_bytes)
            .bind(data.width)
            .bind(data.height)
            .bind(&data.caption)
            .bind(data.taken_on)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProgressPhoto>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM progress_photos WHERE id = $1");
        sqlx::query_as::<_, ProgressPhoto>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_profile(
        pool: &PgPool,
        profile_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ProgressPhoto>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM progress_photos \
             WHERE profile_id = $1 \
             ORDER BY COALESCE(taken_on, created_at::date) DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ProgressPhoto>(&query)
            .bind(profile_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Delete and return the row so the caller can unlink the stored file.
    pub async fn delete(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProgressPhoto>, sqlx::Error> {
        let query = format!("DELETE FROM progress_photos WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, ProgressPhoto>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
