use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use marquee_db::StoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`StoreError`] for store outcomes and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce consistent JSON
/// error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A store-level outcome (not found, edit conflict, persistence fault).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// One or more input fields violate a validation rule. Carries
    /// every violation, field-scoped, collected before reporting.
    #[error("validation failed")]
    Validation(BTreeMap<String, String>),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match &self {
            AppError::Store(store) => {
                let (status, code, message) = classify_store_error(store);
                return (status, axum::Json(json!({ "error": message, "code": code })))
                    .into_response();
            }
            AppError::Validation(fields) => json!({
                "error": "one or more fields failed validation",
                "code": "VALIDATION_ERROR",
                "fields": fields,
            }),
            AppError::BadRequest(msg) => json!({
                "error": msg,
                "code": "BAD_REQUEST",
            }),
        };

        let status = match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::BAD_REQUEST,
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a store error into an HTTP status, error code, and message.
///
/// - `NotFound` maps to 404, `EditConflict` to 409.
/// - Timeouts and database faults map to a sanitized 500; the
///   underlying error is logged, never echoed to the client.
fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::NotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "the requested resource could not be found".to_string(),
        ),
        StoreError::EditConflict => (
            StatusCode::CONFLICT,
            "EDIT_CONFLICT",
            "unable to update the record due to an edit conflict, please try again".to_string(),
        ),
        StoreError::Timeout => {
            tracing::error!("Database statement timed out");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "the server could not process your request".to_string(),
            )
        }
        StoreError::Database(db_err) => {
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "the server could not process your request".to_string(),
            )
        }
    }
}
