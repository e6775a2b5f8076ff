//! Route definitions for the `/app` surface used by the subscriber
//! companion app. Authentication is the `x-api-key` header, resolved by
//! the `AppProfile` extractor on every handler.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::app;
use crate::state::AppState;

/// Routes mounted at `/app`.
///
/// ```text
/// GET    /profile                    -> get_profile
/// PATCH  /profile                    -> update_profile (timezone)
/// GET    /routine                    -> get_routines (grouped with steps)
/// GET    /routine/today              -> today (ensures occurrences)
/// POST   /completions/{id}/complete  -> complete_step
/// GET    /completions                -> list_completions (?from&to)
/// GET    /streak                     -> streak (local today)
/// GET    /goals                      -> list_goals (?status)
/// GET    /surveys                    -> list_surveys (active)
/// POST   /surveys/{id}/response      -> submit_survey_response
/// GET    /photos                     -> list_photos
/// POST   /photos                     -> upload_photo (multipart)
/// GET    /photos/{id}/file           -> serve_photo
/// DELETE /photos/{id}                -> delete_photo
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(app::get_profile).patch(app::update_profile))
        .route("/routine", get(app::get_routines))
        .route("/routine/today", get(app::today))
        .route("/completions/{id}/complete", post(app::complete_step))
        .route("/completions", get(app::list_completions))
        .route("/streak", get(app::streak))
        .route("/goals", get(app::list_goals))
        .route("/surveys", get(app::list_surveys))
        .route("/surveys/{id}/response", post(app::submit_survey_response))
        .route("/photos", get(app::list_photos).post(app::upload_photo))
        .route("/photos/{id}/file", get(app::serve_photo))
        .route("/photos/{id}", axum::routing::delete(app::delete_photo))
}
