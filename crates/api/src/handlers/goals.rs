//! Skin goal management for the console.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use glow_core::types::DbId;
use glow_db::models::goal::{CreateGoal, Goal, UpdateGoal};
use glow_db::repositories::GoalRepo;

use crate::error::AppError;
use crate::handlers::{profiles::find_profile, record_audit};
use crate::middleware::AuthUser;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

/// Legal `goals.status` values, mirroring the table's check constraint.
const GOAL_STATUSES: [&str; 3] = ["active", "achieved", "abandoned"];

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGoalRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateGoalRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct GoalListParams {
    pub status: Option<String>,
}

pub async fn list_goals(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(profile_id): Path<DbId>,
    Query(params): Query<GoalListParams>,
) -> Result<Json<DataResponse<Vec<Goal>>>, AppError> {
    if let Some(status) = &params.status {
        check_status(status)?;
    }
    find_profile(&state, profile_id).await?;
    let goals =
        GoalRepo::list_for_profile(&state.pool, profile_id, params.status.as_deref()).await?;
    Ok(Json(DataResponse::new(goals)))
}

pub async fn create_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(profile_id): Path<DbId>,
    Json(req): Json<CreateGoalRequest>,
) -> Result<Json<DataResponse<Goal>>, AppError> {
    req.validate()?;
    find_profile(&state, profile_id).await?;
    let goal = GoalRepo::create(
        &state.pool,
        &CreateGoal {
            profile_id,
            title: req.title,
            description: req.description,
            target_date: req.target_date,
            sort_order: req.sort_order,
        },
    )
    .await?;
    record_audit(
        &state,
        auth.id,
        "goal.create",
        "goal",
        Some(goal.id),
        Some(json!({ "profile_id": profile_id, "title": goal.title })),
    )
    .await;
    Ok(Json(DataResponse::new(goal)))
}

pub async fn get_goal(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> Result<Json<DataResponse<Goal>>, AppError> {
    let goal = GoalRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Goal"))?;
    Ok(Json(DataResponse::new(goal)))
}

pub async fn update_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(req): Json<UpdateGoalRequest>,
) -> Result<Json<DataResponse<Goal>>, AppError> {
    req.validate()?;
    if let Some(status) = &req.status {
        check_status(status)?;
    }
    let goal = apply_update(
        &state,
        id,
        UpdateGoal {
            title: req.title,
            description: req.description,
            target_date: req.target_date,
            status: req.status,
            sort_order: req.sort_order,
        },
    )
    .await?;
    record_audit(&state, auth.id, "goal.update", "goal", Some(id), None).await;
    Ok(Json(DataResponse::new(goal)))
}

/// Shortcut transition to 'achieved'; stamps `achieved_at`.
pub async fn achieve_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> Result<Json<DataResponse<Goal>>, AppError> {
    let goal = transition(&state, id, "achieved").await?;
    record_audit(&state, auth.id, "goal.achieve", "goal", Some(id), None).await;
    Ok(Json(DataResponse::new(goal)))
}

/// Shortcut transition to 'abandoned'.
pub async fn abandon_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> Result<Json<DataResponse<Goal>>, AppError> {
    let goal = transition(&state, id, "abandoned").await?;
    record_audit(&state, auth.id, "goal.abandon", "goal", Some(id), None).await;
    Ok(Json(DataResponse::new(goal)))
}

pub async fn delete_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> Result<Json<MessageResponse>, AppError> {
    if !GoalRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Goal"));
    }
    record_audit(&state, auth.id, "goal.delete", "goal", Some(id), None).await;
    Ok(Json(MessageResponse::new("Goal deleted")))
}

async fn transition(state: &AppState, id: DbId, status: &str) -> Result<Goal, AppError> {
    apply_update(
        state,
        id,
        UpdateGoal {
            status: Some(status.to_string()),
            ..Default::default()
        },
    )
    .await
}

async fn apply_update(state: &AppState, id: DbId, update: UpdateGoal) -> Result<Goal, AppError> {
    GoalRepo::update(&state.pool, id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("Goal"))
}

fn check_status(status: &str) -> Result<(), AppError> {
    if GOAL_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Unknown goal status: '{status}'"
        )))
    }
}
