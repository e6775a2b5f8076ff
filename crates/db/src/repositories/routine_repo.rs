use sqlx::PgPool;

use crate::models::routine::{
    CreateRoutine, CreateRoutineProduct, Routine, RoutineProduct, ScheduledProduct,
    UpdateRoutine, UpdateRoutineProduct,
};
use glow_core::types::DbId;

const ROUTINE_COLUMNS: &str =
    "id, profile_id, name, description, is_active, created_at, updated_at";

pub struct RoutineRepo;

impl RoutineRepo {
    pub async fn create(pool: &PgPool, data: &CreateRoutine) -> Result<Routine, sqlx::Error> {
        let query = format!(
            "INSERT INTO routines (profile_id, name, description) \
             VALUES ($1, $2, $3) RETURNING {ROUTINE_COLUMNS}"
        );
        sqlx::query_as::<_, Routine>(&query)
            .bind(data.profile_id)
            .bind(&data.name)
            .bind(&data.description)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Routine>, sqlx::Error> {
        let query = format!("SELECT {ROUTINE_COLUMNS} FROM routines WHERE id = $1");
        sqlx::query_as::<_, Routine>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_profile(
        pool: &PgPool,
        profile_id: DbId,
    ) -> Result<Vec<Routine>, sqlx::Error> {
        let query = format!(
            "SELECT {ROUTINE_COLUMNS} FROM routines WHERE profile_id = $1 ORDER BY created_at"
        );
        sqlx::query_as::<_, Routine>(&query)
            .bind(profile_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        data: &UpdateRoutine,
    ) -> Result<Option<Routine>, sqlx::Error> {
        let query = format!(
            "UPDATE routines SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                is_active = COALESCE($4, is_active) \
             WHERE id = $1 RETURNING {ROUTINE_COLUMNS}"
        );
        sqlx::query_as::<_, Routine>(&query)
            .bind(id)
            .bind(&data.name)
            .bind(&data.description)
            .bind(data.is_active)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM routines WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

const PRODUCT_COLUMNS: &str = "id, routine_id, profile_id, step_name, product_name, \
     instructions, frequency, days, time_of_day, sort_order, is_active, \
     created_at, updated_at";

pub struct RoutineProductRepo;

impl RoutineProductRepo {
    pub async fn create(
        pool: &PgPool,
        data: &CreateRoutineProduct,
    ) -> Result<RoutineProduct, sqlx::Error> {
        let query = format!(
            "INSERT INTO routine_products \
                (routine_id, profile_id, step_name, product_name, instructions, \
                 frequency, days, time_of_day, sort_order) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {PRODUCT_COLUMNS}"
        );
        sqlx::query_as::<_, RoutineProduct>(&query)
            .bind(data.routine_id)
            .bind(data.profile_id)
            .bind(&data.step_name)
            .bind(&data.product_name)
            .bind(&data.instructions)
            .bind(&data.frequency)
            .bind(&data.days)
            .bind(&data.time_of_day)
            .bind(data.sort_order)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<RoutineProduct>, sqlx::Error> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM routine_products WHERE id = $1");
        sqlx::query_as::<_, RoutineProduct>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_routine(
        pool: &PgPool,
        routine_id: DbId,
    ) -> Result<Vec<RoutineProduct>, sqlx::Error> {
        let query = format!(
            "SELECT {PRODUCT_COLUMNS} FROM routine_products \
             WHERE routine_id = $1 ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, RoutineProduct>(&query)
            .bind(routine_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_active_for_profile(
        pool: &PgPool,
        profile_id: DbId,
    ) -> Result<Vec<RoutineProduct>, sqlx::Error> {
        let query = format!(
            "SELECT {PRODUCT_COLUMNS} FROM routine_products rp \
             WHERE rp.profile_id = $1 AND rp.is_active \
               AND EXISTS (SELECT 1 FROM routines r WHERE r.id = rp.routine_id AND r.is_active) \
             ORDER BY rp.sort_order, rp.id"
        );
        sqlx::query_as::<_, RoutineProduct>(&query)
            .bind(profile_id)
            .fetch_all(pool)
            .await
    }

    /// Every active step across every active routine of every active
    /// profile, joined with the profile timezone. The occurrence seeder
    /// walks this set once per cycle.
    pub async fn list_schedulable(pool: &PgPool) -> Result<Vec<ScheduledProduct>, sqlx::Error> {
        let query = "SELECT rp.id, rp.routine_id, rp.profile_id, rp.step_name, \
                rp.product_name, rp.instructions, rp.frequency, rp.days, rp.time_of_day, \
                rp.sort_order, rp.is_active, rp.created_at, rp.updated_at, pr.timezone \
             FROM routine_products rp \
             JOIN routines r ON r.id = rp.routine_id \
             JOIN profiles pr ON pr.id = rp.profile_id \
             WHERE rp.is_active AND r.is_active AND pr.is_active \
             ORDER BY rp.profile_id, rp.sort_order, rp.id";
        sqlx::query_as::<_, ScheduledProduct>(query)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        data: &UpdateRoutineProduct,
    ) -> Result<Option<RoutineProduct>, sqlx::Error> {
        let query = format!(
            "UPDATE routine_products SET \
                step_name = COALESCE($2, step_name), \
                product_name = COALESCE($3, product_name), \
                instructions = COALESCE($4, instructions), \
                frequency = COALESCE($5, frequency), \
                days = COALESCE($6, days), \
                time_of_day = COALESCE($7, time_of_day), \
                sort_order = COALESCE($8, sort_order), \
                is_active = COALESCE($9, is_active) \
             WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        );
        sqlx::query_as::<_, RoutineProduct>(&query)
            .bind(id)
            .bind(&data.step_name)
            .bind(&data.product_name)
            .bind(&data.instructions)
            .bind(&data.frequency)
            .bind(&data.days)
            .bind(&data.time_of_day)
            .bind(data.sort_order)
            .bind(data.is_active)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM routine_products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
