//! Stateless repositories, one per table group. Every method takes the
//! pool as its first argument and returns `sqlx::Error` untranslated;
//! the API layer owns the mapping onto HTTP responses.

pub mod admin_user_repo;
pub mod api_key_repo;
pub mod audit_repo;
pub mod completion_repo;
pub mod goal_repo;
pub mod photo_repo;
pub mod profile_repo;
pub mod role_repo;
pub mod routine_repo;
pub mod session_repo;
pub mod survey_repo;

pub use admin_user_repo::AdminUserRepo;
pub use api_key_repo::ApiKeyRepo;
pub use audit_repo::AuditRepo;
pub use completion_repo::{CompletionRepo, PgCompletionSource};
pub use goal_repo::GoalRepo;
pub use photo_repo::PhotoRepo;
pub use profile_repo::ProfileRepo;
pub use role_repo::RoleRepo;
pub use routine_repo::{RoutineProductRepo, RoutineRepo};
pub use session_repo::SessionRepo;
pub use survey_repo::{SurveyRepo, SurveyResponseRepo};
