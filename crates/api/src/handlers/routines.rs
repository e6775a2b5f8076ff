//! Routine and routine-step management for the console.
//!
//! Steps carry the scheduling fields the completion engine consumes:
//! frequency token, optional weekday list, and time of day. Those are
//! validated here so the engine never sees tokens it cannot parse.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use glow_core::types::DbId;
use glow_core::validators::{validate_frequency, validate_time_of_day, validate_weekday_names};
use glow_db::models::routine::{
    CreateRoutine, CreateRoutineProduct, Routine, RoutineProduct, UpdateRoutine,
    UpdateRoutineProduct,
};
use glow_db::repositories::{RoutineProductRepo, RoutineRepo};

use crate::error::AppError;
use crate::handlers::{profiles::find_profile, record_audit};
use crate::middleware::AuthUser;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoutineRequest {
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRoutineRequest {
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 150))]
    pub step_name: String,
    pub product_name: Option<String>,
    pub instructions: Option<String>,
    #[validate(custom(function = validate_frequency))]
    pub frequency: String,
    #[validate(custom(function = validate_weekday_names))]
    pub days: Option<Vec<String>>,
    #[validate(custom(function = validate_time_of_day))]
    pub time_of_day: String,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 150))]
    pub step_name: Option<String>,
    pub product_name: Option<String>,
    pub instructions: Option<String>,
    #[validate(custom(function = validate_frequency))]
    pub frequency: Option<String>,
    #[validate(custom(function = validate_weekday_names))]
    pub days: Option<Vec<String>>,
    #[validate(custom(function = validate_time_of_day))]
    pub time_of_day: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// A routine with its steps in display order.
#[derive(Debug, Serialize)]
pub struct RoutineWithProducts {
    #[serde(flatten)]
    pub routine: Routine,
    pub products: Vec<RoutineProduct>,
}

// ---------------------------------------------------------------------------
// Routines
// ---------------------------------------------------------------------------

pub async fn list_routines(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(profile_id): Path<DbId>,
) -> Result<Json<DataResponse<Vec<Routine>>>, AppError> {
    find_profile(&state, profile_id).await?;
    let routines = RoutineRepo::list_for_profile(&state.pool, profile_id).await?;
    Ok(Json(DataResponse::new(routines)))
}

pub async fn create_routine(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(profile_id): Path<DbId>,
    Json(req): Json<CreateRoutineRequest>,
) -> Result<Json<DataResponse<Routine>>, AppError> {
    req.validate()?;
    find_profile(&state, profile_id).await?;
    let routine = RoutineRepo::create(
        &state.pool,
        &CreateRoutine {
            profile_id,
            name: req.name,
            description: req.description,
        },
    )
    .await?;
    record_audit(
        &state,
        auth.id,
        "routine.create",
        "routine",
        Some(routine.id),
        Some(json!({ "profile_id": profile_id, "name": routine.name })),
    )
    .await;
    Ok(Json(DataResponse::new(routine)))
}

pub async fn get_routine(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> Result<Json<DataResponse<RoutineWithProducts>>, AppError> {
    let routine = find_routine(&state, id).await?;
    let products = RoutineProductRepo::list_for_routine(&state.pool, id).await?;
    Ok(Json(DataResponse::new(RoutineWithProducts {
        routine,
        products,
    })))
}

pub async fn update_routine(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(req): Json<UpdateRoutineRequest>,
) -> Result<Json<DataResponse<Routine>>, AppError> {
    req.validate()?;
    let routine = RoutineRepo::update(
        &state.pool,
        id,
        &UpdateRoutine {
            name: req.name,
            description: req.description,
            is_active: req.is_active,
        },
    )
    .await?
    .ok_or_else(|| AppError::not_found("Routine"))?;
    record_audit(&state, auth.id, "routine.update", "routine", Some(id), None).await;
    Ok(Json(DataResponse::new(routine)))
}

pub async fn delete_routine(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> Result<Json<MessageResponse>, AppError> {
    if !RoutineRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Routine"));
    }
    record_audit(&state, auth.id, "routine.delete", "routine", Some(id), None).await;
    Ok(Json(MessageResponse::new("Routine deleted")))
}

// ---------------------------------------------------------------------------
// Routine products (steps)
// ---------------------------------------------------------------------------

pub async fn list_products(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(routine_id): Path<DbId>,
) -> Result<Json<DataResponse<Vec<RoutineProduct>>>, AppError> {
    find_routine(&state, routine_id).await?;
    let products = RoutineProductRepo::list_for_routine(&state.pool, routine_id).await?;
    Ok(Json(DataResponse::new(products)))
}

pub async fn create_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(routine_id): Path<DbId>,
    Json(req): Json<CreateProductRequest>,
) -> Result<Json<DataResponse<RoutineProduct>>, AppError> {
    req.validate()?;
    let routine = find_routine(&state, routine_id).await?;
    let product = RoutineProductRepo::create(
        &state.pool,
        &CreateRoutineProduct {
            routine_id,
            profile_id: routine.profile_id,
            step_name: req.step_name,
            product_name: req.product_name,
            instructions: req.instructions,
            frequency: req.frequency,
            days: req.days,
            time_of_day: req.time_of_day,
            sort_order: req.sort_order,
        },
    )
    .await?;
    record_audit(
        &state,
        auth.id,
        "routine_product.create",
        "routine_product",
        Some(product.id),
        Some(json!({ "routine_id": routine_id, "step_name": product.step_name })),
    )
    .await;
    Ok(Json(DataResponse::new(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((routine_id, id)): Path<(DbId, DbId)>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<DataResponse<RoutineProduct>>, AppError> {
    req.validate()?;
    find_scoped_product(&state, routine_id, id).await?;
    let product = RoutineProductRepo::update(
        &state.pool,
        id,
        &UpdateRoutineProduct {
            step_name: req.step_name,
            product_name: req.product_name,
            instructions: req.instructions,
            frequency: req.frequency,
            days: req.days,
            time_of_day: req.time_of_day,
            sort_order: req.sort_order,
            is_active: req.is_active,
        },
    )
    .await?
    .ok_or_else(|| AppError::not_found("Routine step"))?;
    record_audit(
        &state,
        auth.id,
        "routine_product.update",
        "routine_product",
        Some(id),
        None,
    )
    .await;
    Ok(Json(DataResponse::new(product)))
}

pub async fn delete_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((routine_id, id)): Path<(DbId, DbId)>,
) -> Result<Json<MessageResponse>, AppError> {
    find_scoped_product(&state, routine_id, id).await?;
    if !RoutineProductRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Routine step"));
    }
    record_audit(
        &state,
        auth.id,
        "routine_product.delete",
        "routine_product",
        Some(id),
        None,
    )
    .await;
    Ok(Json(MessageResponse::new("Routine step deleted")))
}

async fn find_routine(state: &AppState, id: DbId) -> Result<Routine, AppError> {
    RoutineRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Routine"))
}

/// Steps are only addressable through the routine that owns them.
async fn find_scoped_product(
    state: &AppState,
    routine_id: DbId,
    id: DbId,
) -> Result<RoutineProduct, AppError> {
    let product = RoutineProductRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|p| p.routine_id == routine_id)
        .ok_or_else(|| AppError::not_found("Routine step"))?;
    Ok(product)
}
