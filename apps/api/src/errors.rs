use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::ingest::IngestError;
use crate::matching::error::MatchError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Document error: {0}")]
    Ingest(#[from] IngestError),

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Matching error: {0}")]
    Matching(#[from] MatchError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Ingest(_) => StatusCode::BAD_REQUEST,
            AppError::Matching(MatchError::InputValidation(_)) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Matching(MatchError::Computation(_)) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) | AppError::Matching(MatchError::InputValidation(_)) => {
                "VALIDATION_ERROR"
            }
            AppError::Ingest(IngestError::UnsupportedFormat(_)) => "UNSUPPORTED_FORMAT",
            AppError::Ingest(_) => "EXTRACTION_ERROR",
            AppError::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            AppError::Matching(MatchError::Computation(_)) => "MATCHING_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to the client. Server-side failures are logged and
    /// replaced with a generic message.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Matching(MatchError::InputValidation(msg)) => msg.clone(),
            AppError::Ingest(e) => e.to_string(),
            AppError::PayloadTooLarge => {
                "File is too large. Please upload a smaller file.".to_string()
            }
            AppError::Matching(MatchError::Computation(msg)) => {
                tracing::error!("Matching error: {msg}");
                "An error occurred while processing your request. Please try again.".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.public_message()
            }
        }));

        (self.status(), body).into_response()
    }
}
