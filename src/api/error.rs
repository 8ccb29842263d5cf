//! API Error Types
//!
//! Every failure leaves the relay as `{"detail": "..."}`, the body shape
//! the chat clients read their error text from.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use railchat_core::wire::ErrorDetail;

use crate::completion::CompletionError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request body could not be read as a chat request
    #[error("{0}")]
    Validation(String),

    /// Azure OpenAI call failed
    #[error(transparent)]
    Completion(#[from] CompletionError),

    /// Internal server error
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Completion(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ApiError::Internal(_) | ApiError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        tracing::error!(
            request_id = %request_id,
            status = status.as_u16(),
            error_message = %self,
            "API error occurred"
        );

        (status, Json(ErrorDetail::new(self.to_string()))).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Validation("missing field".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(CompletionError::RateLimited("slow down".into())).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::from(CompletionError::MissingChoices).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_completion_detail_is_passed_through() {
        let err = ApiError::from(CompletionError::BadRequest("content filter".into()));
        assert_eq!(err.to_string(), "Azure OpenAI Bad Request Error: content filter");
    }
}
