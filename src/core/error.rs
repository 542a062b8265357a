use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use uuid::Uuid;

use crate::shared::types::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    /// Loading a tree or a catalog page from the procurement backend failed
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    /// Create/update/delete was rejected by the procurement backend
    #[error("Mutation failed: {0}")]
    MutationFailed(String),

    /// The parent relation reaches the given category twice
    #[error("Cycle detected at category {0}")]
    CycleDetected(Uuid),
}

impl AppError {
    /// Static message shown inline by a view when a load fails
    pub fn user_message(&self) -> String {
        match self {
            AppError::FetchFailed(_) => "Failed to load categories".to_string(),
            AppError::MutationFailed(_) => "Failed to save category".to_string(),
            AppError::Validation(msg) | AppError::BadRequest(msg) | AppError::NotFound(msg) => {
                msg.clone()
            }
            AppError::CycleDetected(_) => {
                "A category cannot be placed under itself or its descendants".to_string()
            }
            AppError::Internal(_) => "Internal error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::Validation(ref msg) => (
                StatusCode::BAD_REQUEST,
                msg.clone(),
                Some(vec![msg.clone()]),
            ),
            AppError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
            AppError::FetchFailed(ref msg) => {
                tracing::error!("Fetch failed: {}", msg);
                (StatusCode::BAD_GATEWAY, self.user_message(), None)
            }
            AppError::MutationFailed(ref msg) => {
                tracing::error!("Mutation failed: {}", msg);
                (StatusCode::BAD_GATEWAY, self.user_message(), None)
            }
            AppError::CycleDetected(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                self.user_message(),
                Some(vec![self.to_string()]),
            ),
        };

        let body = Json(ApiResponse::<()>::error(Some(message), errors));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
