//! Error types for aical-api

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use aical_calendar::CalendarError;

use crate::handlers::ErrorResponse;

/// aical-api error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Core error: {0}")]
    Core(#[from] aical_core::Error),

    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),
}

impl ApiError {
    /// Status code and client-facing message
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Calendar(CalendarError::Backend { status, message }) => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                message.clone(),
            ),
            ApiError::Calendar(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            ApiError::Core(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ApiError>;
