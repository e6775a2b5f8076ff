//! Request extractors enforcing authentication and authorization.

pub mod app_auth;
pub mod auth;
pub mod rbac;

pub use app_auth::AppProfile;
pub use auth::AuthUser;
pub use rbac::RequireAdmin;
