//! Route definitions for the `/surveys` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::surveys;
use crate::state::AppState;

/// Routes mounted at `/surveys`. Create/update/delete require the admin
/// role (enforced by handler extractors).
///
/// ```text
/// GET    /                 -> list_surveys (?active_only)
/// POST   /                 -> create_survey (admin only)
/// GET    /{id}             -> get_survey
/// PUT    /{id}             -> update_survey (admin only)
/// DELETE /{id}             -> delete_survey (admin only)
/// GET    /{id}/responses   -> list_survey_responses
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(surveys::list_surveys).post(surveys::create_survey),
        )
        .route(
            "/{id}",
            get(surveys::get_survey)
                .put(surveys::update_survey)
                .delete(surveys::delete_survey),
        )
        .route("/{id}/responses", get(surveys::list_survey_responses))
}
