use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use glow_core::compliance::{Frequency, SchedulePolicy, TimeOfDay};
use glow_core::error::CoreError;
use glow_core::types::{DbId, Timestamp};

/// Matches the `routines` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Routine {
    pub id: DbId,
    pub profile_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoutine {
    pub profile_id: DbId,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRoutine {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// Matches the `routine_products` table. `frequency` and `time_of_day`
/// hold the token forms parsed by glow-core; they are validated before
/// insert, so the typed accessors only fail on hand-edited rows.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RoutineProduct {
    pub id: DbId,
    pub routine_id: DbId,
    pub profile_id: DbId,
    pub step_name: String,
    pub product_name: Option<String>,
    pub instructions: Option<String>,
    pub frequency: String,
    pub days: Option<Vec<String>>,
    pub time_of_day: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RoutineProduct {
    pub fn time_of_day(&self) -> Result<TimeOfDay, CoreError> {
        self.time_of_day.parse()
    }

    pub fn frequency(&self) -> Result<Frequency, CoreError> {
        self.frequency.parse()
    }

    pub fn schedule_policy(&self) -> Result<SchedulePolicy, CoreError> {
        Ok(SchedulePolicy {
            frequency: self.frequency()?,
            days: self.days.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct CreateRoutineProduct {
    pub routine_id: DbId,
    pub profile_id: DbId,
    pub step_name: String,
    pub product_name: Option<String>,
    pub instructions: Option<String>,
    pub frequency: String,
    pub days: Option<Vec<String>>,
    pub time_of_day: String,
    pub sort_order: i32,
}

/// A routine product joined with its subscriber's timezone, as consumed
/// by the occurrence seeder.
#[derive(Debug, Clone, FromRow)]
pub struct ScheduledProduct {
    #[sqlx(flatten)]
    pub product: RoutineProduct,
    pub timezone: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRoutineProduct {
    pub step_name: Option<String>,
    pub product_name: Option<String>,
    pub instructions: Option<String>,
    pub frequency: Option<String>,
    pub days: Option<Vec<String>>,
    pub time_of_day: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}
