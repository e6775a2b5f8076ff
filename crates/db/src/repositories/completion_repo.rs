use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::models::completion::{Completion, CreateCompletion};
use glow_core::compliance::CompletionStatus;
use glow_core::error::CoreError;
use glow_core::streak::CompletionSource;
use glow_core::types::{DbId, Timestamp};

const COLUMNS: &str = "id, routine_product_id, profile_id, scheduled_date, time_of_day, \
     on_time_deadline, grace_period_end, status, completed_at, created_at, updated_at";

pub struct CompletionRepo;

impl CompletionRepo {
    /// Insert a pending occurrence unless one already exists for this
    /// product and date. Returns `None` on conflict, which makes the
    /// seeder idempotent across overlapping runs.
    pub async fn create_if_absent(
        pool: &PgPool,
        data: &CreateCompletion,
    ) -> Result<Option<Completion>, sqlx::Error> {
        let query = format!(
            "INSERT INTO routine_step_completions \
                (routine_product_id, profile_id, scheduled_date, time_of_day, \
                 on_time_deadline, grace_period_end) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (routine_product_id, scheduled_date) DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Completion>(&query)
            .bind(data.routine_product_id)
            .bind(data.profile_id)
            .bind(data.scheduled_date)
            .bind(&data.time_of_day)
            .bind(data.on_time_deadline)
            .bind(data.grace_period_end)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Completion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM routine_step_completions WHERE id = $1");
        sqlx::query_as::<_, Completion>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_profile_date(
        pool: &PgPool,
        profile_id: DbId,
        date: NaiveDate,
    ) -> Result<Vec<Completion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM routine_step_completions \
             WHERE profile_id = $1 AND scheduled_date = $2 \
             ORDER BY time_of_day, id"
        );
        sqlx::query_as::<_, Completion>(&query)
            .bind(profile_id)
            .bind(date)
            .fetch_all(pool)
            .await
    }

    pub async fn list_for_profile_range(
        pool: &PgPool,
        profile_id: DbId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Completion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM routine_step_completions \
             WHERE profile_id = $1 AND scheduled_date BETWEEN $2 AND $3 \
             ORDER BY scheduled_date DESC, time_of_day, id"
        );
        sqlx::query_as::<_, Completion>(&query)
            .bind(profile_id)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await
    }

    /// Date and status token of every row in `[from, to]`, the narrow
    /// projection the streak walk needs.
    pub async fn status_rows(
        pool: &PgPool,
        profile_id: DbId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<(NaiveDate, String)>, sqlx::Error> {
        sqlx::query_as::<_, (NaiveDate, String)>(
            "SELECT scheduled_date, status FROM routine_step_completions \
             WHERE profile_id = $1 AND scheduled_date BETWEEN $2 AND $3",
        )
        .bind(profile_id)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }

    /// Row counts per status token over a date range, for the compliance
    /// summary endpoint.
    pub async fn status_counts_in_range(
        pool: &PgPool,
        profile_id: DbId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM routine_step_completions \
             WHERE profile_id = $1 AND scheduled_date BETWEEN $2 AND $3 \
             GROUP BY status",
        )
        .bind(profile_id)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }

    /// Stamp a completion time and status onto a row that has never been
    /// completed. Returns `None` when the row is absent or already has a
    /// completion timestamp; rows the sweep marked missed are still
    /// eligible, so a subscriber can complete late-but-within-grace steps
    /// the sweep beat them to.
    pub async fn record_completion(
        pool: &PgPool,
        id: DbId,
        completed_at: Timestamp,
        status: CompletionStatus,
    ) -> Result<Option<Completion>, sqlx::Error> {
        let query = format!(
            "UPDATE routine_step_completions \
             SET completed_at = $2, status = $3 \
             WHERE id = $1 AND completed_at IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Completion>(&query)
            .bind(id)
            .bind(completed_at)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Flip every pending row whose grace period has fully elapsed to
    /// missed. Completing exactly at the grace end is still late, so the
    /// comparison is strict.
    pub async fn mark_missed_expired(pool: &PgPool, now: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE routine_step_completions SET status = 'missed' \
             WHERE status = 'pending' AND grace_period_end < $1",
        )
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}

/// Adapter giving the streak walk read access to completion rows.
pub struct PgCompletionSource<'a>(pub &'a PgPool);

#[async_trait]
impl CompletionSource for PgCompletionSource<'_> {
    async fn statuses_by_date(
        &self,
        profile_id: DbId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<HashMap<NaiveDate, Vec<CompletionStatus>>, CoreError> {
        let rows = CompletionRepo::status_rows(self.0, profile_id, from, to)
            .await
            .map_err(|e| CoreError::StorageUnavailable(e.to_string()))?;
        let mut by_date: HashMap<NaiveDate, Vec<CompletionStatus>> = HashMap::new();
        for (date, token) in rows {
            let status = token.parse::<CompletionStatus>().map_err(|_| {
                CoreError::Internal(format!("Unknown status token '{token}' in completion row"))
            })?;
            by_date.entry(date).or_default().push(status);
        }
        Ok(by_date)
    }
}
