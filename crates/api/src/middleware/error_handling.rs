//! # Error Handling Middleware
//!
//! Maps domain errors to HTTP status codes and the JSON error body every
//! endpoint shares: `{"success": false, "error": "..."}`.
//!
//! | error            | status |
//! |------------------|--------|
//! | `Validation`     | 400    |
//! | `Authentication` | 401    |
//! | `Authorization`  | 403    |
//! | `NotFound`       | 404    |
//! | `Conflict`       | 409    |
//! | `Storage`        | 500    |
//! | `Internal`       | 500    |
//!
//! Server-side failures are logged with their full cause chain; the client
//! only sees a generic message for them.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rosterdesk_core::errors::RosterError;
use serde_json::json;
use tracing::error;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use rosterdesk_api::middleware::error_handling::AppError;
/// use rosterdesk_core::errors::RosterError;
///
/// async fn handler(team: Option<String>) -> Result<Json<String>, AppError> {
///     let team = team.ok_or_else(|| RosterError::validation("Team name is required"))?;
///     Ok(Json(team))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub RosterError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            RosterError::Validation(_) => StatusCode::BAD_REQUEST,
            RosterError::Authentication(_) => StatusCode::UNAUTHORIZED,
            RosterError::Authorization(_) => StatusCode::FORBIDDEN,
            RosterError::NotFound(_) => StatusCode::NOT_FOUND,
            RosterError::Conflict(_) => StatusCode::CONFLICT,
            RosterError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RosterError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError(RosterError::Authentication(msg.into()))
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError(RosterError::Authorization(msg.into()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self.0 {
            RosterError::Storage(report) => {
                error!("Storage failure: {:?}", report);
                "A storage error occurred".to_string()
            }
            RosterError::Internal(err) => {
                error!("Internal failure: {}", err);
                "An internal error occurred".to_string()
            }
            RosterError::NotFound(what) => format!("{} not found", what),
            RosterError::Validation(msg)
            | RosterError::Authentication(msg)
            | RosterError::Authorization(msg)
            | RosterError::Conflict(msg) => msg.clone(),
        };

        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}

/// Automatic conversion from RosterError to AppError
impl From<RosterError> for AppError {
    fn from(err: RosterError) -> Self {
        AppError(err)
    }
}

/// Automatic conversion from eyre::Report to AppError
///
/// Store functions return `eyre::Result`; their failures are storage errors.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(RosterError::Storage(err))
    }
}

/// Malformed JSON bodies are validation errors with the same body shape.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError(RosterError::Validation(rejection.body_text()))
    }
}

/// Maps a RosterError to an HTTP response
pub fn map_error(err: RosterError) -> Response {
    AppError(err).into_response()
}
