//! Occurrence generation: materializes pending completion rows for the
//! dates a routine schedule applies to.
//!
//! Generation is idempotent end to end. Deadlines are computed once, at
//! generation time, from the profile's current timezone; a later timezone
//! change affects future occurrences only.

use chrono::NaiveDate;

use glow_core::compliance::{calculate_deadlines, local_date_in, should_generate_for_date};
use glow_core::types::Timestamp;
use glow_db::models::completion::{Completion, CreateCompletion};
use glow_db::models::profile::Profile;
use glow_db::models::routine::RoutineProduct;
use glow_db::repositories::{CompletionRepo, RoutineProductRepo};
use glow_db::DbPool;

use crate::error::AppError;

/// Generate the occurrence for one step on one date. `Ok(None)` when the
/// schedule skips the date or the row already exists.
pub async fn generate_for_product(
    pool: &DbPool,
    product: &RoutineProduct,
    timezone: &str,
    date: NaiveDate,
) -> Result<Option<Completion>, AppError> {
    let policy = product.schedule_policy()?;
    if !should_generate_for_date(&policy, date) {
        return Ok(None);
    }
    let time_of_day = product.time_of_day()?;
    let deadlines = calculate_deadlines(date, time_of_day, timezone)?;
    let created = CompletionRepo::create_if_absent(
        pool,
        &CreateCompletion {
            routine_product_id: product.id,
            profile_id: product.profile_id,
            scheduled_date: date,
            time_of_day: product.time_of_day.clone(),
            on_time_deadline: deadlines.on_time_deadline,
            grace_period_end: deadlines.grace_period_end,
        },
    )
    .await?;
    Ok(created)
}

/// Generate every applicable occurrence for one profile on `date`.
/// Returns the number of rows actually created.
pub async fn generate_for_profile(
    pool: &DbPool,
    profile: &Profile,
    date: NaiveDate,
) -> Result<u64, AppError> {
    let products = RoutineProductRepo::list_active_for_profile(pool, profile.id).await?;
    let mut created = 0;
    for product in &products {
        if generate_for_product(pool, product, &profile.timezone, date)
            .await?
            .is_some()
        {
            created += 1;
        }
    }
    Ok(created)
}

/// One seeder cycle: create the current day's occurrences for every
/// schedulable step, where "current day" is each subscriber's local date
/// at `now`. A failure on one step is logged and does not stall the rest.
pub async fn seed_current_occurrences(pool: &DbPool, now: Timestamp) -> Result<u64, AppError> {
    let entries = RoutineProductRepo::list_schedulable(pool).await?;
    let mut created = 0u64;
    for entry in &entries {
        let today = match local_date_in(&entry.timezone, now) {
            Ok(date) => date,
            Err(e) => {
                tracing::warn!(
                    product_id = entry.product.id,
                    error = %e,
                    "skipping step with unusable profile timezone"
                );
                continue;
            }
        };
        match generate_for_product(pool, &entry.product, &entry.timezone, today).await {
            Ok(Some(_)) => created += 1,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    product_id = entry.product.id,
                    error = ?e,
                    "occurrence generation failed for step"
                );
            }
        }
    }
    Ok(created)
}
