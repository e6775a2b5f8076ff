use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use glow_core::types::{DbId, Timestamp};

/// Matches the `goals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Goal {
    pub id: DbId,
    pub profile_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub status: String,
    pub achieved_at: Option<Timestamp>,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGoal {
    pub profile_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateGoal {
    pub title: Option<String>,
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub sort_order: Option<i32>,
}
