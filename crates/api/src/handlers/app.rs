//! Consumer companion-app endpoints, authenticated per request with an
//! `x-api-key` header. Every read and write here is scoped to the
//! subscriber that owns the key; cross-profile ids come back as 404.

use axum::extract::{Multipart, Path, Query, State};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use glow_core::compliance::local_date_in;
use glow_core::streak::current_streak;
use glow_core::types::{DbId, Timestamp};
use glow_core::validators::validate_timezone;
use glow_db::models::completion::Completion;
use glow_db::models::goal::Goal;
use glow_db::models::photo::ProgressPhoto;
use glow_db::models::profile::{Profile, UpdateProfile};
use glow_db::models::routine::RoutineProduct;
use glow_db::models::survey::{CreateSurveyResponse, Survey, SurveyResponse};
use glow_db::repositories::{
    CompletionRepo, GoalRepo, PgCompletionSource, PhotoRepo, ProfileRepo, RoutineProductRepo,
    RoutineRepo, SurveyRepo, SurveyResponseRepo,
};

use crate::engine::occurrences::generate_for_profile;
use crate::error::AppError;
use crate::handlers::completions::{record_step_completion, StreakResponse};
use crate::handlers::goals::GoalListParams;
use crate::handlers::photos::{photo_file_response, remove_photo_file, store_photo};
use crate::handlers::routines::RoutineWithProducts;
use crate::handlers::surveys::find_survey;
use crate::middleware::AppProfile;
use crate::query::{DateRangeParams, ListParams};
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct AppUpdateProfileRequest {
    #[validate(custom(function = validate_timezone))]
    pub timezone: Option<String>,
    pub skin_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AppCompleteRequest {
    /// Client-side completion time for offline sync; defaults to now.
    pub completed_at: Option<Timestamp>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitResponseRequest {
    pub answers: serde_json::Value,
}

/// One step occurrence on the subscriber's today screen.
#[derive(Debug, Serialize)]
pub struct TodayStep {
    #[serde(flatten)]
    pub completion: Completion,
    pub step_name: String,
    pub product_name: Option<String>,
    pub instructions: Option<String>,
    pub sort_order: i32,
}

pub async fn get_profile(app: AppProfile) -> Json<DataResponse<Profile>> {
    Json(DataResponse::new(app.profile))
}

pub async fn update_profile(
    State(state): State<AppState>,
    app: AppProfile,
    Json(req): Json<AppUpdateProfileRequest>,
) -> Result<Json<DataResponse<Profile>>, AppError> {
    req.validate()?;
    let profile = ProfileRepo::update(
        &state.pool,
        app.profile.id,
        &UpdateProfile {
            timezone: req.timezone,
            skin_type: req.skin_type,
            ..Default::default()
        },
    )
    .await?
    .ok_or_else(|| AppError::not_found("Profile"))?;
    Ok(Json(DataResponse::new(profile)))
}

/// Active routines with their active steps, the app's "my routine" view.
pub async fn get_routines(
    State(state): State<AppState>,
    app: AppProfile,
) -> Result<Json<DataResponse<Vec<RoutineWithProducts>>>, AppError> {
    let routines = RoutineRepo::list_for_profile(&state.pool, app.profile.id).await?;
    let mut products =
        RoutineProductRepo::list_active_for_profile(&state.pool, app.profile.id).await?;
    let mut grouped = Vec::new();
    for routine in routines.into_iter().filter(|r| r.is_active) {
        let (mine, rest): (Vec<_>, Vec<_>) =
            products.into_iter().partition(|p| p.routine_id == routine.id);
        products = rest;
        grouped.push(RoutineWithProducts {
            routine,
            products: mine,
        });
    }
    Ok(Json(DataResponse::new(grouped)))
}

/// Today's step occurrences in the subscriber's timezone. Generation runs
/// first so a request ahead of the hourly seeder still sees the full day.
pub async fn today(
    State(state): State<AppState>,
    app: AppProfile,
) -> Result<Json<DataResponse<Vec<TodayStep>>>, AppError> {
    let date = local_date_in(&app.profile.timezone, Utc::now())?;
    generate_for_profile(&state.pool, &app.profile, date).await?;

    let completions =
        CompletionRepo::list_for_profile_date(&state.pool, app.profile.id, date).await?;
    let mut steps = Vec::with_capacity(completions.len());
    for completion in completions {
        let product = step_for(&state, completion.routine_product_id).await?;
        steps.push(TodayStep {
            completion,
            step_name: product.step_name,
            product_name: product.product_name,
            instructions: product.instructions,
            sort_order: product.sort_order,
        });
    }
    steps.sort_by_key(|s| (s.sort_order, s.completion.id));
    Ok(Json(DataResponse::new(steps)))
}

pub async fn complete_step(
    State(state): State<AppState>,
    app: AppProfile,
    Path(id): Path<DbId>,
    Json(req): Json<AppCompleteRequest>,
) -> Result<Json<DataResponse<Completion>>, AppError> {
    let completion = CompletionRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|c| c.profile_id == app.profile.id)
        .ok_or_else(|| AppError::not_found("Completion"))?;
    let updated = record_step_completion(
        &state.pool,
        &completion,
        req.completed_at.unwrap_or_else(Utc::now),
    )
    .await?;
    Ok(Json(DataResponse::new(updated)))
}

pub async fn list_completions(
    State(state): State<AppState>,
    app: AppProfile,
    Query(range): Query<DateRangeParams>,
) -> Result<Json<DataResponse<Vec<Completion>>>, AppError> {
    range.validate_order()?;
    let completions =
        CompletionRepo::list_for_profile_range(&state.pool, app.profile.id, range.from, range.to)
            .await?;
    Ok(Json(DataResponse::new(completions)))
}

/// Streak as of the subscriber's current local date.
pub async fn streak(
    State(state): State<AppState>,
    app: AppProfile,
) -> Result<Json<DataResponse<StreakResponse>>, AppError> {
    let as_of = local_date_in(&app.profile.timezone, Utc::now())?;
    let source = PgCompletionSource(&state.pool);
    let streak = current_streak(&source, app.profile.id, as_of).await?;
    Ok(Json(DataResponse::new(StreakResponse { as_of, streak })))
}

pub async fn list_goals(
    State(state): State<AppState>,
    app: AppProfile,
    Query(params): Query<GoalListParams>,
) -> Result<Json<DataResponse<Vec<Goal>>>, AppError> {
    let goals =
        GoalRepo::list_for_profile(&state.pool, app.profile.id, params.status.as_deref()).await?;
    Ok(Json(DataResponse::new(goals)))
}

pub async fn list_surveys(
    State(state): State<AppState>,
    _app: AppProfile,
) -> Result<Json<DataResponse<Vec<Survey>>>, AppError> {
    let paging = ListParams::default();
    let surveys = SurveyRepo::list(&state.pool, true, paging.limit(), paging.offset()).await?;
    Ok(Json(DataResponse::new(surveys)))
}

pub async fn submit_survey_response(
    State(state): State<AppState>,
    app: AppProfile,
    Path(survey_id): Path<DbId>,
    Json(req): Json<SubmitResponseRequest>,
) -> Result<Json<DataResponse<SurveyResponse>>, AppError> {
    if req.answers.is_null() {
        return Err(AppError::Validation("'answers' is required".to_string()));
    }
    let survey = find_survey(&state, survey_id).await?;
    if !survey.is_active {
        return Err(AppError::Validation(
            "This survey is no longer accepting responses".to_string(),
        ));
    }
    let response = SurveyResponseRepo::create(
        &state.pool,
        &CreateSurveyResponse {
            survey_id,
            profile_id: app.profile.id,
            answers: req.answers,
        },
    )
    .await?;
    Ok(Json(DataResponse::new(response)))
}

pub async fn list_photos(
    State(state): State<AppState>,
    app: AppProfile,
    Query(params): Query<ListParams>,
) -> Result<Json<DataResponse<Vec<ProgressPhoto>>>, AppError> {
    let photos = PhotoRepo::list_for_profile(
        &state.pool,
        app.profile.id,
        params.limit(),
        params.offset(),
    )
    .await?;
    Ok(Json(DataResponse::new(photos)))
}

pub async fn upload_photo(
    State(state): State<AppState>,
    app: AppProfile,
    multipart: Multipart,
) -> Result<Json<DataResponse<ProgressPhoto>>, AppError> {
    let photo = store_photo(&state, app.profile.id, multipart).await?;
    Ok(Json(DataResponse::new(photo)))
}

pub async fn serve_photo(
    State(state): State<AppState>,
    app: AppProfile,
    Path(id): Path<DbId>,
) -> Result<Response, AppError> {
    let photo = find_owned_photo(&state, &app, id).await?;
    photo_file_response(&state, &photo).await
}

pub async fn delete_photo(
    State(state): State<AppState>,
    app: AppProfile,
    Path(id): Path<DbId>,
) -> Result<Json<MessageResponse>, AppError> {
    find_owned_photo(&state, &app, id).await?;
    let photo = PhotoRepo::delete(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Photo"))?;
    remove_photo_file(&state, &photo).await;
    Ok(Json(MessageResponse::new("Photo deleted")))
}

async fn find_owned_photo(
    state: &AppState,
    app: &AppProfile,
    id: DbId,
) -> Result<ProgressPhoto, AppError> {
    PhotoRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|p| p.profile_id == app.profile.id)
        .ok_or_else(|| AppError::not_found("Photo"))
}

/// Steps referenced by today's rows are usually active; a step deactivated
/// after generation still resolves through the direct lookup.
async fn step_for(state: &AppState, id: DbId) -> Result<RoutineProduct, AppError> {
    RoutineProductRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Completion references missing step {id}")))
}
