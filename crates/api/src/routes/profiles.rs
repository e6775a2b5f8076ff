//! Route definitions for the `/profiles` resource and its sub-resources.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{api_keys, completions, goals, photos, profiles, routines, surveys};
use crate::state::AppState;

/// Routes mounted at `/profiles`.
///
/// ```text
/// GET    /                        -> list_profiles
/// POST   /                        -> create_profile
/// GET    /{id}                    -> get_profile
/// PUT    /{id}                    -> update_profile
/// DELETE /{id}                    -> delete_profile (admin only)
///
/// GET    /{id}/routines           -> list_routines
/// POST   /{id}/routines           -> create_routine
/// GET    /{id}/goals              -> list_goals
/// POST   /{id}/goals              -> create_goal
/// GET    /{id}/api-keys           -> list_api_keys
/// POST   /{id}/api-keys           -> issue_api_key
/// GET    /{id}/photos             -> list_photos
/// POST   /{id}/photos             -> upload_photo (multipart)
/// GET    /{id}/survey-responses   -> list_profile_responses
///
/// GET    /{id}/completions        -> list_completions (?from&to)
/// POST   /{id}/occurrences        -> generate_occurrences
/// GET    /{id}/compliance         -> compliance_summary (?from&to)
/// GET    /{id}/streak             -> streak (?as_of)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(profiles::list_profiles).post(profiles::create_profile),
        )
        .route(
            "/{id}",
            get(profiles::get_profile)
                .put(profiles::update_profile)
                .delete(profiles::delete_profile),
        )
        .route(
            "/{id}/routines",
            get(routines::list_routines).post(routines::create_routine),
        )
        .route(
            "/{id}/goals",
            get(goals::list_goals).post(goals::create_goal),
        )
        .route(
            "/{id}/api-keys",
            get(api_keys::list_api_keys).post(api_keys::issue_api_key),
        )
        .route(
            "/{id}/photos",
            get(photos::list_photos).post(photos::upload_photo),
        )
        .route("/{id}/survey-responses", get(surveys::list_profile_responses))
        .route("/{id}/completions", get(completions::list_completions))
        .route("/{id}/occurrences", post(completions::generate_occurrences))
        .route("/{id}/compliance", get(completions::compliance_summary))
        .route("/{id}/streak", get(completions::streak))
}
