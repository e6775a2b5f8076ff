//! Custom field validators plugged into `#[derive(Validate)]` request
//! payloads in the API crate.

use validator::ValidationError;

use crate::compliance::{Frequency, TimeOfDay, WEEKDAY_NAMES};

pub fn validate_timezone(tz: &str) -> Result<(), ValidationError> {
    tz.parse::<chrono_tz::Tz>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_timezone"))
}

pub fn validate_frequency(token: &str) -> Result<(), ValidationError> {
    token
        .parse::<Frequency>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_frequency"))
}

pub fn validate_time_of_day(token: &str) -> Result<(), ValidationError> {
    token
        .parse::<TimeOfDay>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_time_of_day"))
}

/// Every entry must be a full English weekday name, exact case.
pub fn validate_weekday_names(days: &[String]) -> Result<(), ValidationError> {
    if days.iter().all(|d| WEEKDAY_NAMES.contains(&d.as_str())) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_weekday"))
    }
}
