use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Standard error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

/// Startup configuration errors. Fatal — no request is served if any of
/// these fire, so they never map to an HTTP response.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingVar(&'static str),

    #[error("{name} has invalid value '{value}': {reason}")]
    InvalidVar {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The geocoder found no matching city. User-correctable.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Transport failure or non-success status from OpenWeather.
    #[error("Weather provider error: {0}")]
    Provider(String),

    /// OpenWeather answered successfully but the payload is missing expected fields.
    #[error("Weather data error: {0}")]
    Data(String),

    /// History file unreadable/unwritable for reasons other than absence.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Provider(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::Data(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::Storage(msg) => {
                tracing::error!("History storage error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal storage error".to_string(),
                )
            }
        };

        (status, axum::Json(ErrorResponse { error: message })).into_response()
    }
}
