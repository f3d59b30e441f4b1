//! HTTP error responses
//!
//! Every failure leaves the server as a JSON body `{"error": "<message>"}`.
//! Store failures are logged here and replaced by a per-operation message.

use crate::error::AppError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthenticated() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Please authenticate")
    }

    /// Map a service error, using `fallback` for anything the caller must
    /// not see the detail of
    pub fn from_app(err: AppError, fallback: &str) -> Self {
        match err {
            AppError::Unauthenticated => Self::unauthenticated(),
            AppError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "Todo not found"),
            AppError::Validation(message) | AppError::Conflict(message) => {
                Self::new(StatusCode::BAD_REQUEST, message)
            }
            other => {
                tracing::error!("{}: {}", fallback, other);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, fallback)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Extension for attaching a fallback message to service results
pub trait OrApiError<T> {
    fn or_api_error(self, fallback: &str) -> Result<T, ApiError>;
}

impl<T> OrApiError<T> for crate::error::Result<T> {
    fn or_api_error(self, fallback: &str) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::from_app(e, fallback))
    }
}
