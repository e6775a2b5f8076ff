//! Completion lifecycle endpoints for the console: occurrence generation,
//! range listings, completion recording, and the compliance/streak reads.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use glow_core::compliance::{determine_status, local_date_in, CompletionStatus};
use glow_core::streak::{current_streak, is_perfect_day};
use glow_core::types::{DbId, Timestamp};
use glow_db::models::completion::Completion;
use glow_db::repositories::{CompletionRepo, PgCompletionSource};
use glow_db::DbPool;

use crate::engine::occurrences::generate_for_profile;
use crate::error::AppError;
use crate::handlers::{profiles::find_profile, record_audit};
use crate::middleware::AuthUser;
use crate::query::DateRangeParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateOccurrencesRequest {
    /// Defaults to the profile's current local date.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct GeneratedOccurrences {
    pub date: NaiveDate,
    pub created: u64,
}

#[derive(Debug, Deserialize)]
pub struct CompleteStepRequest {
    /// Defaults to the server's current time. Backdating is allowed;
    /// status is always derived from the stored deadlines.
    pub completed_at: Option<Timestamp>,
}

#[derive(Debug, Deserialize)]
pub struct StreakParams {
    /// Walk the streak as of this date instead of the profile's local
    /// today.
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct StreakResponse {
    pub as_of: NaiveDate,
    pub streak: i64,
}

/// Status counts for a single scheduled day.
#[derive(Debug, Default, Serialize)]
pub struct DayCompliance {
    pub date: NaiveDate,
    pub pending: i64,
    pub on_time: i64,
    pub late: i64,
    pub missed: i64,
    /// At least one record and nothing pending or missed.
    pub perfect: bool,
}

#[derive(Debug, Default, Serialize)]
pub struct ComplianceTotals {
    pub pending: i64,
    pub on_time: i64,
    pub late: i64,
    pub missed: i64,
}

#[derive(Debug, Serialize)]
pub struct ComplianceSummary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub days: Vec<DayCompliance>,
    pub totals: ComplianceTotals,
    /// Fulfilled (on-time or late) share of all scheduled steps in range.
    pub completion_rate: f64,
}

pub async fn list_completions(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(profile_id): Path<DbId>,
    Query(range): Query<DateRangeParams>,
) -> Result<Json<DataResponse<Vec<Completion>>>, AppError> {
    range.validate_order()?;
    find_profile(&state, profile_id).await?;
    let completions =
        CompletionRepo::list_for_profile_range(&state.pool, profile_id, range.from, range.to)
            .await?;
    Ok(Json(DataResponse::new(completions)))
}

/// Materialize occurrences for one profile and date, ahead of the hourly
/// seeder. Safe to call repeatedly.
pub async fn generate_occurrences(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(profile_id): Path<DbId>,
    Json(req): Json<GenerateOccurrencesRequest>,
) -> Result<Json<DataResponse<GeneratedOccurrences>>, AppError> {
    let profile = find_profile(&state, profile_id).await?;
    let date = match req.date {
        Some(date) => date,
        None => local_date_in(&profile.timezone, Utc::now())?,
    };
    let created = generate_for_profile(&state.pool, &profile, date).await?;
    record_audit(
        &state,
        auth.id,
        "completion.generate",
        "profile",
        Some(profile_id),
        Some(serde_json::json!({ "date": date, "created": created })),
    )
    .await;
    Ok(Json(DataResponse::new(GeneratedOccurrences { date, created })))
}

/// Record a completion on behalf of a subscriber (coach data entry).
pub async fn complete_step(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
    Json(req): Json<CompleteStepRequest>,
) -> Result<Json<DataResponse<Completion>>, AppError> {
    let completion = CompletionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Completion"))?;
    let updated = record_step_completion(
        &state.pool,
        &completion,
        req.completed_at.unwrap_or_else(Utc::now),
    )
    .await?;
    Ok(Json(DataResponse::new(updated)))
}

pub async fn compliance_summary(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(profile_id): Path<DbId>,
    Query(range): Query<DateRangeParams>,
) -> Result<Json<DataResponse<ComplianceSummary>>, AppError> {
    range.validate_order()?;
    find_profile(&state, profile_id).await?;

    let rows =
        CompletionRepo::status_rows(&state.pool, profile_id, range.from, range.to).await?;
    let mut by_date: BTreeMap<NaiveDate, Vec<CompletionStatus>> = BTreeMap::new();
    for (date, token) in rows {
        let status = token
            .parse::<CompletionStatus>()
            .map_err(|_| AppError::Internal(format!("Unknown status token '{token}'")))?;
        by_date.entry(date).or_default().push(status);
    }
    let days: Vec<DayCompliance> = by_date
        .into_iter()
        .map(|(date, statuses)| {
            let mut day = DayCompliance {
                date,
                perfect: is_perfect_day(&statuses),
                ..Default::default()
            };
            for status in statuses {
                match status {
                    CompletionStatus::Pending => day.pending += 1,
                    CompletionStatus::OnTime => day.on_time += 1,
                    CompletionStatus::Late => day.late += 1,
                    CompletionStatus::Missed => day.missed += 1,
                }
            }
            day
        })
        .collect();

    let mut totals = ComplianceTotals::default();
    for (token, count) in
        CompletionRepo::status_counts_in_range(&state.pool, profile_id, range.from, range.to)
            .await?
    {
        match token.parse::<CompletionStatus>() {
            Ok(CompletionStatus::Pending) => totals.pending = count,
            Ok(CompletionStatus::OnTime) => totals.on_time = count,
            Ok(CompletionStatus::Late) => totals.late = count,
            Ok(CompletionStatus::Missed) => totals.missed = count,
            Err(_) => {
                return Err(AppError::Internal(format!("Unknown status token '{token}'")));
            }
        }
    }
    let scheduled = totals.pending + totals.on_time + totals.late + totals.missed;
    let fulfilled = totals.on_time + totals.late;
    let completion_rate = if scheduled > 0 {
        fulfilled as f64 / scheduled as f64
    } else {
        0.0
    };

    Ok(Json(DataResponse::new(ComplianceSummary {
        from: range.from,
        to: range.to,
        days,
        totals,
        completion_rate,
    })))
}

pub async fn streak(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(profile_id): Path<DbId>,
    Query(params): Query<StreakParams>,
) -> Result<Json<DataResponse<StreakResponse>>, AppError> {
    let profile = find_profile(&state, profile_id).await?;
    let as_of = match params.as_of {
        Some(date) => date,
        None => local_date_in(&profile.timezone, Utc::now())?,
    };
    let source = PgCompletionSource(&state.pool);
    let streak = current_streak(&source, profile_id, as_of).await?;
    Ok(Json(DataResponse::new(StreakResponse { as_of, streak })))
}

/// Derive the status from the stored deadlines and stamp it onto the row.
/// A row that already has a completion time rejects the write.
pub(crate) async fn record_step_completion(
    pool: &DbPool,
    completion: &Completion,
    completed_at: Timestamp,
) -> Result<Completion, AppError> {
    let status = determine_status(
        completed_at,
        completion.on_time_deadline,
        completion.grace_period_end,
    );
    CompletionRepo::record_completion(pool, completion.id, completed_at, status)
        .await?
        .ok_or_else(|| AppError::Conflict("This step has already been completed".to_string()))
}
