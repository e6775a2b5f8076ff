//! Audit trail listing. Entries are written by the mutating handlers;
//! this module only reads them back.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use glow_core::pagination::{clamp_limit, clamp_offset};
use glow_core::types::DbId;
use glow_db::models::audit::AuditEntry;
use glow_db::repositories::AuditRepo;

use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AuditListParams {
    pub admin_user_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_audit_entries(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Query(params): Query<AuditListParams>,
) -> Result<Json<DataResponse<Vec<AuditEntry>>>, AppError> {
    let entries = AuditRepo::list(
        &state.pool,
        params.admin_user_id,
        clamp_limit(params.limit),
        clamp_offset(params.offset),
    )
    .await?;
    Ok(Json(DataResponse::new(entries)))
}
