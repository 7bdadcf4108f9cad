//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;
use septoctor_core::{InferenceError, SchemaMismatchError, ValidationError};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Input field could not be coerced
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Mapper and trained model disagree
    #[error(transparent)]
    SchemaMismatch(#[from] SchemaMismatchError),

    #[error("model error: {0}")]
    Model(String),

    /// Unparseable body or query
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<InferenceError> for AppError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::Validation(e) => AppError::Validation(e),
            InferenceError::SchemaMismatch(e) => AppError::SchemaMismatch(e),
            InferenceError::Model(msg) => AppError::Model(msg),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, detail) = match &self {
            AppError::Validation(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                e.to_string(),
                Some(json!({
                    "field": e.field,
                    "value": e.value,
                    "expected": e.expected,
                })),
            ),
            // Already logged at error level where the vector was ordered
            AppError::SchemaMismatch(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "model/feature schema mismatch".to_string(),
                None,
            ),
            AppError::Model(msg) => {
                tracing::error!("Model error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Model evaluation failed".to_string(), None)
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string(), None)
            }
        };

        let mut body = json!({
            "error": error_message,
            "status": status.as_u16()
        });
        if let Some(detail) = detail {
            body["detail"] = detail;
        }

        (status, Json(body)).into_response()
    }
}
