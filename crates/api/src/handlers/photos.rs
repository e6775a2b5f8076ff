//! Progress photo upload, listing, serving, and deletion.
//!
//! Uploads are multipart forms with a required `file` field and optional
//! `caption` / `taken_on` fields. Bytes go to the media store; the row
//! keeps the relative path plus probed dimensions.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use serde_json::json;

use glow_core::types::DbId;
use glow_db::models::photo::{CreateProgressPhoto, ProgressPhoto};
use glow_db::repositories::PhotoRepo;

use crate::error::AppError;
use crate::handlers::{profiles::find_profile, record_audit};
use crate::middleware::AuthUser;
use crate::query::ListParams;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

const MAX_CAPTION_CHARS: usize = 500;

pub async fn list_photos(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(profile_id): Path<DbId>,
    Query(params): Query<ListParams>,
) -> Result<Json<DataResponse<Vec<ProgressPhoto>>>, AppError> {
    find_profile(&state, profile_id).await?;
    let photos =
        PhotoRepo::list_for_profile(&state.pool, profile_id, params.limit(), params.offset())
            .await?;
    Ok(Json(DataResponse::new(photos)))
}

pub async fn upload_photo(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(profile_id): Path<DbId>,
    multipart: Multipart,
) -> Result<Json<DataResponse<ProgressPhoto>>, AppError> {
    find_profile(&state, profile_id).await?;
    let photo = store_photo(&state, profile_id, multipart).await?;
    record_audit(
        &state,
        auth.id,
        "photo.upload",
        "progress_photo",
        Some(photo.id),
        Some(json!({ "profile_id": profile_id })),
    )
    .await;
    Ok(Json(DataResponse::new(photo)))
}

pub async fn serve_photo(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> Result<Response, AppError> {
    let photo = find_photo(&state, id).await?;
    photo_file_response(&state, &photo).await
}

pub async fn delete_photo(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> Result<Json<MessageResponse>, AppError> {
    let photo = PhotoRepo::delete(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Photo"))?;
    remove_photo_file(&state, &photo).await;
    record_audit(
        &state,
        auth.id,
        "photo.delete",
        "progress_photo",
        Some(id),
        None,
    )
    .await;
    Ok(Json(MessageResponse::new("Photo deleted")))
}

pub(crate) async fn find_photo(state: &AppState, id: DbId) -> Result<ProgressPhoto, AppError> {
    PhotoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Photo"))
}

/// Stream the stored bytes with the recorded content type.
pub(crate) async fn photo_file_response(
    state: &AppState,
    photo: &ProgressPhoto,
) -> Result<Response, AppError> {
    let bytes = state.media.read(&photo.file_path).await?;
    Ok(([(header::CONTENT_TYPE, photo.content_type.clone())], bytes).into_response())
}

/// Unlink the stored file after its row is gone. Failures are logged; the
/// row deletion has already committed.
pub(crate) async fn remove_photo_file(state: &AppState, photo: &ProgressPhoto) {
    if let Err(e) = state.media.delete(&photo.file_path).await {
        tracing::warn!(photo_id = photo.id, error = ?e, "photo file removal failed");
    }
}

/// Parse the multipart form, persist the file, insert the row. Shared by
/// the console and consumer-app upload endpoints.
pub(crate) async fn store_photo(
    state: &AppState,
    profile_id: DbId,
    mut multipart: Multipart,
) -> Result<ProgressPhoto, AppError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut caption: Option<String> = None;
    let mut taken_on: Option<NaiveDate> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let content_type = field
                    .content_type()
                    .ok_or_else(|| {
                        AppError::Validation("The 'file' part needs a content type".to_string())
                    })?
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                file = Some((content_type, data.to_vec()));
            }
            "caption" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                if text.chars().count() > MAX_CAPTION_CHARS {
                    return Err(AppError::Validation(format!(
                        "Caption exceeds {MAX_CAPTION_CHARS} characters"
                    )));
                }
                caption = Some(text);
            }
            "taken_on" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                let date = text.parse::<NaiveDate>().map_err(|_| {
                    AppError::Validation("'taken_on' must be an ISO date (YYYY-MM-DD)".to_string())
                })?;
                taken_on = Some(date);
            }
            _ => {}
        }
    }

    let (content_type, bytes) =
        file.ok_or_else(|| AppError::Validation("Missing required 'file' field".to_string()))?;
    if bytes.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }

    let stored = state.media.save_photo(profile_id, &content_type, &bytes).await?;
    let created = PhotoRepo::create(
        &state.pool,
        &CreateProgressPhoto {
            profile_id,
            file_path: stored.relative_path.clone(),
            content_type,
            file_size_bytes: stored.size_bytes,
            width: stored.width,
            height: stored.height,
            caption,
            taken_on,
        },
    )
    .await;
    match created {
        Ok(photo) => Ok(photo),
        Err(e) => {
            // Roll the file back so it cannot leak without a row.
            if let Err(cleanup) = state.media.delete(&stored.relative_path).await {
                tracing::warn!(error = ?cleanup, "orphaned upload cleanup failed");
            }
            Err(e.into())
        }
    }
}
