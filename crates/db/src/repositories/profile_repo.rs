use sqlx::PgPool;

use crate::models::profile::{CreateProfile, Profile, UpdateProfile};
use glow_core::types::DbId;

const COLUMNS: &str = "id, email, first_name, last_name, timezone, skin_type, \
     birth_date, notes, is_active, created_at, updated_at";

pub struct ProfileRepo;

impl ProfileRepo {
    pub async fn create(pool: &PgPool, data: &CreateProfile) -> Result<Profile, sqlx::Error> {
        let query = format!(
            "INSERT INTO profiles (email, first_name, last_name, timezone, skin_type, \
                                   birth_date, notes) \
             VALUES ($1, $2, $3, COALESCE($4, 'UTC'), $5, $6, $7) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(&data.email)
            .bind(&data.first_name)
            .bind(&data.last_name)
            .bind(&data.timezone)
            .bind(&data.skin_type)
            .bind(data.birth_date)
            .bind(&data.notes)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List newest first, optionally filtered by a case-insensitive
    /// match on name or email.
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Profile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM profiles \
             WHERE $1::text IS NULL \
                OR email ILIKE '%' || $1 || '%' \
                OR first_name ILIKE '%' || $1 || '%' \
                OR last_name ILIKE '%' || $1 || '%' \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(search)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        data: &UpdateProfile,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!(
            "UPDATE profiles SET \
                email = COALESCE($2, email), \
                first_name = COALESCE($3, first_name), \
                last_name = COALESCE($4, last_name), \
                timezone = COALESCE($5, timezone), \
                skin_type = COALESCE($6, skin_type), \
                birth_date = COALESCE($7, birth_date), \
                notes = COALESCE($8, notes), \
                is_active = COALESCE($9, is_active) \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .bind(&data.email)
            .bind(&data.first_name)
            .bind(&data.last_name)
            .bind(&data.timezone)
            .bind(&data.skin_type)
            .bind(data.birth_date)
            .bind(&data.notes)
            .bind(data.is_active)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
