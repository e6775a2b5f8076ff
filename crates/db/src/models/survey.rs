use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use glow_core::types::{DbId, Timestamp};

/// Matches the `surveys` table. Question shape is owned by the console;
/// the backend stores it as opaque JSON.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Survey {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub questions: serde_json::Value,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSurvey {
    pub title: String,
    pub description: Option<String>,
    pub questions: serde_json::Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSurvey {
    pub title: Option<String>,
    pub description: Option<String>,
    pub questions: Option<serde_json::Value>,
    pub is_active: Option<bool>,
}

/// Matches the append-only `survey_responses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SurveyResponse {
    pub id: DbId,
    pub survey_id: DbId,
    pub profile_id: DbId,
    pub answers: serde_json::Value,
    pub submitted_at: Timestamp,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateSurveyResponse {
    pub survey_id: DbId,
    pub profile_id: DbId,
    pub answers: serde_json::Value,
}
