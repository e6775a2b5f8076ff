//! Subscriber profile management for the console.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use glow_core::types::DbId;
use glow_core::validators::validate_timezone;
use glow_db::models::profile::{CreateProfile, Profile, UpdateProfile};
use glow_db::repositories::ProfileRepo;

use crate::error::AppError;
use crate::handlers::record_audit;
use crate::middleware::{AuthUser, RequireAdmin};
use crate::query::ListParams;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProfileRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(custom(function = validate_timezone))]
    pub timezone: Option<String>,
    pub skin_type: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(custom(function = validate_timezone))]
    pub timezone: Option<String>,
    pub skin_type: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

pub async fn list_profiles(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<DataResponse<Vec<Profile>>>, AppError> {
    let profiles = ProfileRepo::list(
        &state.pool,
        params.search(),
        params.limit(),
        params.offset(),
    )
    .await?;
    Ok(Json(DataResponse::new(profiles)))
}

pub async fn create_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateProfileRequest>,
) -> Result<Json<DataResponse<Profile>>, AppError> {
    req.validate()?;
    let profile = ProfileRepo::create(
        &state.pool,
        &CreateProfile {
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            timezone: req.timezone,
            skin_type: req.skin_type,
            birth_date: req.birth_date,
            notes: req.notes,
        },
    )
    .await?;
    record_audit(
        &state,
        auth.id,
        "profile.create",
        "profile",
        Some(profile.id),
        Some(json!({ "email": profile.email })),
    )
    .await;
    Ok(Json(DataResponse::new(profile)))
}

pub async fn get_profile(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> Result<Json<DataResponse<Profile>>, AppError> {
    let profile = find_profile(&state, id).await?;
    Ok(Json(DataResponse::new(profile)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<DataResponse<Profile>>, AppError> {
    req.validate()?;
    let timezone_changed = req.timezone.is_some();
    let profile = ProfileRepo::update(
        &state.pool,
        id,
        &UpdateProfile {
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            timezone: req.timezone,
            skin_type: req.skin_type,
            birth_date: req.birth_date,
            notes: req.notes,
            is_active: req.is_active,
        },
    )
    .await?
    .ok_or_else(|| AppError::not_found("Profile"))?;
    if timezone_changed {
        // Existing occurrences keep their already-computed deadlines.
        tracing::info!(profile_id = id, timezone = %profile.timezone, "profile timezone changed");
    }
    record_audit(&state, auth.id, "profile.update", "profile", Some(id), None).await;
    Ok(Json(DataResponse::new(profile)))
}

pub async fn delete_profile(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<DbId>,
) -> Result<Json<MessageResponse>, AppError> {
    if !ProfileRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Profile"));
    }
    record_audit(&state, auth.id, "profile.delete", "profile", Some(id), None).await;
    Ok(Json(MessageResponse::new("Profile deleted")))
}

pub(crate) async fn find_profile(state: &AppState, id: DbId) -> Result<Profile, AppError> {
    ProfileRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Profile"))
}
