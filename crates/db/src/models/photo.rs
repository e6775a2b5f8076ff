use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

use glow_core::types::{DbId, Timestamp};

/// Matches the `progress_photos` table. `file_path` is relative to the
/// configured media root. Rows are append-only; deleting one also removes
/// the stored file.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProgressPhoto {
    pub id: DbId,
    pub profile_id: DbId,
    #[serde(skip_serializing)]
    pub file_path: String,
    pub content_type: String,
    pub file_size_bytes: i64,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub caption: Option<String>,
    pub taken_on: Option<NaiveDate>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateProgressPhoto {
    pub profile_id: DbId,
    pub file_path: String,
    pub content_type: String,
    pub file_size_bytes: i64,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub caption: Option<String>,
    pub taken_on: Option<NaiveDate>,
}
