//! Domain types and pure business logic for the glow coaching backend.
//!
//! Nothing in this crate touches the network or the database. The API and
//! repository crates depend on it; it depends on neither, so the compliance
//! rules can be exercised in isolation.

pub mod api_keys;
pub mod compliance;
pub mod error;
pub mod pagination;
pub mod roles;
pub mod streak;
pub mod types;
pub mod validators;

pub use error::CoreError;
