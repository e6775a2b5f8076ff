use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

use glow_core::compliance::CompletionStatus;
use glow_core::error::CoreError;
use glow_core::types::{DbId, Timestamp};

/// Matches the `routine_step_completions` table: one row per scheduled
/// occurrence of a routine step. `status` holds a token accepted by
/// glow-core's parser.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Completion {
    pub id: DbId,
    pub routine_product_id: DbId,
    pub profile_id: DbId,
    pub scheduled_date: NaiveDate,
    pub time_of_day: String,
    pub on_time_deadline: Timestamp,
    pub grace_period_end: Timestamp,
    pub status: String,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Completion {
    pub fn status(&self) -> Result<CompletionStatus, CoreError> {
        self.status.parse()
    }
}

/// Insert payload for a freshly generated occurrence. Status always
/// starts out pending.
#[derive(Debug, Clone)]
pub struct CreateCompletion {
    pub routine_product_id: DbId,
    pub profile_id: DbId,
    pub scheduled_date: NaiveDate,
    pub time_of_day: String,
    pub on_time_deadline: Timestamp,
    pub grace_period_end: Timestamp,
}
