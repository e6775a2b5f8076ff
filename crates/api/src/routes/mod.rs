pub mod admin;
pub mod api_keys;
pub mod app;
pub mod audit;
pub mod auth;
pub mod completions;
pub mod goals;
pub mod health;
pub mod photos;
pub mod profiles;
pub mod routines;
pub mod surveys;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                              login (public)
/// /auth/refresh                            refresh (public)
/// /auth/logout                             logout
/// /auth/me                                 current operator
/// /auth/change-password                    change own password
///
/// /admin/users                             list, create (admin only)
/// /admin/users/{id}                        get, update, delete
/// /admin/users/{id}/reset-password         reset password
/// /roles                                   list roles
///
/// /profiles                                list, create
/// /profiles/{id}                           get, update, delete (delete: admin)
/// /profiles/{id}/routines                  list, create
/// /profiles/{id}/goals                     list, create
/// /profiles/{id}/api-keys                  list, issue
/// /profiles/{id}/photos                    list, upload (multipart)
/// /profiles/{id}/survey-responses          list responses by subscriber
/// /profiles/{id}/completions               list in range (?from&to)
/// /profiles/{id}/occurrences               generate for a date (POST)
/// /profiles/{id}/compliance                per-day status summary (?from&to)
/// /profiles/{id}/streak                    streak (?as_of)
///
/// /routines/{id}                           get (with steps), update, delete
/// /routines/{routine_id}/products          list, create
/// /routines/{routine_id}/products/{id}     update, delete
///
/// /goals/{id}                              get, update, delete
/// /goals/{id}/achieve                      transition to achieved (POST)
/// /goals/{id}/abandon                      transition to abandoned (POST)
///
/// /completions/{id}/complete               record completion (POST)
///
/// /api-keys/{id}/revoke                    deactivate key (POST)
/// /api-keys/{id}                           hard delete (DELETE)
///
/// /surveys                                 list, create (create: admin)
/// /surveys/{id}                            get, update, delete (admin)
/// /surveys/{id}/responses                  list responses
///
/// /photos/{id}/file                        raw bytes (GET)
/// /photos/{id}                             delete row and file
///
/// /audit                                   audit trail (admin only)
///
/// /app/profile                             subscriber profile (GET, PATCH)
/// /app/routine                             active routines with steps
/// /app/routine/today                       today's occurrences
/// /app/completions                         list in range (?from&to)
/// /app/completions/{id}/complete           record completion (POST)
/// /app/streak                              streak at local today
/// /app/goals                               own goals (?status)
/// /app/surveys                             active surveys
/// /app/surveys/{id}/response               submit answers (POST)
/// /app/photos                              list, upload (multipart)
/// /app/photos/{id}/file                    raw bytes (GET)
/// /app/photos/{id}                         delete own photo
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Console authentication (login, refresh, logout).
        .nest("/auth", auth::router())
        // Operator account management.
        .nest("/admin", admin::router())
        .route("/roles", get(handlers::admin_users::list_roles))
        // Subscriber profiles and their sub-resources.
        .nest("/profiles", profiles::router())
        // Routines addressed by id, with nested steps.
        .nest("/routines", routines::router())
        // Goals addressed by id, with status transitions.
        .nest("/goals", goals::router())
        // Completion recording for the console.
        .nest("/completions", completions::router())
        // API key revocation and deletion.
        .nest("/api-keys", api_keys::router())
        // Survey definitions and response listings.
        .nest("/surveys", surveys::router())
        // Photo bytes and deletion.
        .nest("/photos", photos::router())
        // Audit trail.
        .nest("/audit", audit::router())
        // Subscriber companion app, keyed by x-api-key.
        .nest("/app", app::router())
}
