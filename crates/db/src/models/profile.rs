use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use glow_core::types::{DbId, Timestamp};

/// Matches the `profiles` table. `timezone` is an IANA identifier and is
/// the authority for all local-date computations for this subscriber.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Profile {
    pub id: DbId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub timezone: String,
    pub skin_type: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProfile {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub timezone: Option<String>,
    pub skin_type: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfile {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub timezone: Option<String>,
    pub skin_type: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}
