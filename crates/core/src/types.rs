//! Shared primitive aliases used across crates.

use chrono::{DateTime, Utc};

/// Database identifier type (BIGSERIAL in Postgres).
pub type DbId = i64;

/// UTC timestamp used throughout the system.
pub type Timestamp = DateTime<Utc>;
