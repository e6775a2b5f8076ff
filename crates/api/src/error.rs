//! API error type and its HTTP mapping.
//!
//! Handlers return `Result<_, AppError>`; conversions funnel domain and
//! database failures into one place so every error leaves the API as
//! `{"error": <message>, "code": <machine code>}` with a fitting status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use glow_core::error::CoreError;

#[derive(Debug)]
pub enum AppError {
    Validation(String),
    InvalidTimezone(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    StorageUnavailable(String),
    Database(sqlx::Error),
    Internal(String),
}

impl AppError {
    pub fn not_found(entity: &str) -> Self {
        Self::NotFound(format!("{entity} not found"))
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::InvalidTimezone(_) => (StatusCode::BAD_REQUEST, "INVALID_TIMEZONE"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            AppError::StorageUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "STORAGE_UNAVAILABLE")
            }
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Validation(m)
            | AppError::Unauthorized(m)
            | AppError::Forbidden(m)
            | AppError::NotFound(m)
            | AppError::Conflict(m)
            | AppError::StorageUnavailable(m) => m.clone(),
            AppError::InvalidTimezone(tz) => format!("Unknown timezone identifier: {tz}"),
            // Internals are logged, not leaked.
            AppError::Database(_) | AppError::Internal(_) => {
                "An internal error occurred".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            match &self {
                AppError::Database(e) => tracing::error!(error = %e, "database error"),
                AppError::Internal(m) => tracing::error!(message = %m, "internal error"),
                other => tracing::error!(?other, "server error"),
            }
        }
        let body = Json(json!({ "error": self.message(), "code": code }));
        (status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity, id } => {
                AppError::NotFound(format!("{entity} {id} not found"))
            }
            CoreError::Validation(m) => AppError::Validation(m),
            CoreError::Conflict(m) => AppError::Conflict(m),
            CoreError::Unauthorized(m) => AppError::Unauthorized(m),
            CoreError::Forbidden(m) => AppError::Forbidden(m),
            CoreError::InvalidTimezone(tz) => AppError::InvalidTimezone(tz),
            CoreError::StorageUnavailable(m) => AppError::StorageUnavailable(m),
            CoreError::Internal(m) => AppError::Internal(m),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        classify_sqlx_error(err)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errs: validator::ValidationErrors) -> Self {
        let mut parts: Vec<String> = errs
            .field_errors()
            .iter()
            .map(|(field, errors)| {
                let codes: Vec<&str> = errors.iter().map(|e| e.code.as_ref()).collect();
                format!("{field}: {}", codes.join(", "))
            })
            .collect();
        parts.sort();
        AppError::Validation(parts.join("; "))
    }
}

/// Turn constraint violations into client errors instead of opaque 500s.
pub fn classify_sqlx_error(err: sqlx::Error) -> AppError {
    if let Some(db_err) = err.as_database_error() {
        match db_err.code().as_deref() {
            // unique_violation
            Some("23505") => {
                let message = match db_err.constraint() {
                    Some("uq_profiles_email") => "A profile with this email already exists",
                    Some("uq_admin_users_username") => "This username is already taken",
                    Some("uq_admin_users_email") => {
                        "An admin user with this email already exists"
                    }
                    Some("uq_surveys_title") => "A survey with this title already exists",
                    Some("uq_completions_product_date") => {
                        "An occurrence for this step and date already exists"
                    }
                    _ => "A record with these values already exists",
                };
                return AppError::Conflict(message.to_string());
            }
            // foreign_key_violation
            Some("23503") => {
                return AppError::Validation("Referenced record does not exist".to_string());
            }
            // check_violation
            Some("23514") => {
                return AppError::Validation("Value violates a data constraint".to_string());
            }
            _ => {}
        }
    }
    if matches!(err, sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed) {
        return AppError::StorageUnavailable("database pool unavailable".to_string());
    }
    AppError::Database(err)
}
