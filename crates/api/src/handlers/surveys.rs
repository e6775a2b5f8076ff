//! Survey management. Question and answer payloads are opaque JSON; the
//! console defines their shape.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use glow_core::types::DbId;
use glow_db::models::survey::{CreateSurvey, Survey, SurveyResponse, UpdateSurvey};
use glow_db::repositories::{SurveyRepo, SurveyResponseRepo};

use crate::error::AppError;
use crate::handlers::{profiles::find_profile, record_audit};
use crate::middleware::{AuthUser, RequireAdmin};
use crate::query::ListParams;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSurveyRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    pub questions: serde_json::Value,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSurveyRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub questions: Option<serde_json::Value>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SurveyListParams {
    #[serde(default)]
    pub active_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_surveys(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<SurveyListParams>,
) -> Result<Json<DataResponse<Vec<Survey>>>, AppError> {
    let paging = ListParams {
        limit: params.limit,
        offset: params.offset,
        q: None,
    };
    let surveys = SurveyRepo::list(
        &state.pool,
        params.active_only,
        paging.limit(),
        paging.offset(),
    )
    .await?;
    Ok(Json(DataResponse::new(surveys)))
}

pub async fn create_survey(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Json(req): Json<CreateSurveyRequest>,
) -> Result<Json<DataResponse<Survey>>, AppError> {
    req.validate()?;
    check_questions(&req.questions)?;
    let survey = SurveyRepo::create(
        &state.pool,
        &CreateSurvey {
            title: req.title,
            description: req.description,
            questions: req.questions,
        },
    )
    .await?;
    record_audit(
        &state,
        auth.id,
        "survey.create",
        "survey",
        Some(survey.id),
        Some(json!({ "title": survey.title })),
    )
    .await;
    Ok(Json(DataResponse::new(survey)))
}

pub async fn get_survey(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> Result<Json<DataResponse<Survey>>, AppError> {
    let survey = find_survey(&state, id).await?;
    Ok(Json(DataResponse::new(survey)))
}

pub async fn update_survey(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<DbId>,
    Json(req): Json<UpdateSurveyRequest>,
) -> Result<Json<DataResponse<Survey>>, AppError> {
    req.validate()?;
    if let Some(questions) = &req.questions {
        check_questions(questions)?;
    }
    let survey = SurveyRepo::update(
        &state.pool,
        id,
        &UpdateSurvey {
            title: req.title,
            description: req.description,
            questions: req.questions,
            is_active: req.is_active,
        },
    )
    .await?
    .ok_or_else(|| AppError::not_found("Survey"))?;
    record_audit(&state, auth.id, "survey.update", "survey", Some(id), None).await;
    Ok(Json(DataResponse::new(survey)))
}

pub async fn delete_survey(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<DbId>,
) -> Result<Json<MessageResponse>, AppError> {
    if !SurveyRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Survey"));
    }
    record_audit(&state, auth.id, "survey.delete", "survey", Some(id), None).await;
    Ok(Json(MessageResponse::new("Survey deleted")))
}

pub async fn list_survey_responses(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(survey_id): Path<DbId>,
    Query(params): Query<ListParams>,
) -> Result<Json<DataResponse<Vec<SurveyResponse>>>, AppError> {
    find_survey(&state, survey_id).await?;
    let responses = SurveyResponseRepo::list_for_survey(
        &state.pool,
        survey_id,
        params.limit(),
        params.offset(),
    )
    .await?;
    Ok(Json(DataResponse::new(responses)))
}

pub async fn list_profile_responses(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(profile_id): Path<DbId>,
    Query(params): Query<ListParams>,
) -> Result<Json<DataResponse<Vec<SurveyResponse>>>, AppError> {
    find_profile(&state, profile_id).await?;
    let responses = SurveyResponseRepo::list_for_profile(
        &state.pool,
        profile_id,
        params.limit(),
        params.offset(),
    )
    .await?;
    Ok(Json(DataResponse::new(responses)))
}

pub(crate) async fn find_survey(state: &AppState, id: DbId) -> Result<Survey, AppError> {
    SurveyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Survey"))
}

/// Questions must be a non-empty JSON array.
pub(crate) fn check_questions(questions: &serde_json::Value) -> Result<(), AppError> {
    match questions.as_array() {
        Some(list) if !list.is_empty() => Ok(()),
        _ => Err(AppError::Validation(
            "'questions' must be a non-empty array".to_string(),
        )),
    }
}
