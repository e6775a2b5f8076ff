//! Scheduling engine glue between routine definitions and completion
//! rows.

pub mod occurrences;
