use sqlx::PgPool;

use crate::models::goal::{CreateGoal, Goal, UpdateGoal};
use glow_core::types::DbId;

const COLUMNS: &str = "id, profile_id, title, description, target_date, status, \
     achieved_at, sort_order, created_at, updated_at";

pub struct GoalRepo;

impl GoalRepo {
    pub async fn create(pool: &PgPool, data: &CreateGoal) -> Result<Goal, sqlx::Error> {
        let query = format!(
            "INSERT INTO goals (profile_id, title, description, target_date, sort_order) \
             VALUES ($1, $2, $3, $4, COALESCE($5, 0)) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Goal>(&query)
            .bind(data.profile_id)
            .bind(&data.title)
            .bind(&data.description)
            .bind(data.target_date)
            .bind(data.sort_order)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Goal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM goals WHERE id = $1");
        sqlx::query_as::<_, Goal>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_profile(
        pool: &PgPool,
        profile_id: DbId,
        status: Option<&str>,
    ) -> Result<Vec<Goal>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM goals \
             WHERE profile_id = $1 AND ($2::text IS NULL OR status = $2) \
             ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, Goal>(&query)
            .bind(profile_id)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// Patch update. `achieved_at` tracks the status column: entering
    /// 'achieved' stamps it, leaving 'achieved' clears it.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        data: &UpdateGoal,
    ) -> Result<Option<Goal>, sqlx::Error> {
        let query = format!(
            "UPDATE goals SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                target_date = COALESCE($4, target_date), \
                status = COALESCE($5, status), \
                sort_order = COALESCE($6, sort_order), \
                achieved_at = CASE \
                    WHEN $5 = 'achieved' AND status <> 'achieved' THEN NOW() \
                    WHEN $5 IS NOT NULL AND $5 <> 'achieved' THEN NULL \
                    ELSE achieved_at \
                END \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Goal>(&query)
            .bind(id)
            .bind(&data.title)
            .bind(&data.description)
            .bind(data.target_date)
            .bind(&data.status)
            .bind(data.sort_order)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM goals WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
