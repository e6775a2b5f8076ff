//! Query-string parameter shapes shared across list endpoints.

use chrono::NaiveDate;
use serde::Deserialize;

use glow_core::pagination::{clamp_limit, clamp_offset};

/// Pagination plus optional free-text search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub q: Option<String>,
}

impl ListParams {
    pub fn limit(&self) -> i64 {
        clamp_limit(self.limit)
    }

    pub fn offset(&self) -> i64 {
        clamp_offset(self.offset)
    }

    pub fn search(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Inclusive scheduled-date range for completion queries.
#[derive(Debug, Clone, Deserialize)]
pub struct DateRangeParams {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRangeParams {
    /// Reject reversed ranges before they reach the database.
    pub fn validate_order(&self) -> Result<(), crate::error::AppError> {
        if self.from > self.to {
            return Err(crate::error::AppError::Validation(
                "'from' must not be after 'to'".to_string(),
            ));
        }
        Ok(())
    }
}
