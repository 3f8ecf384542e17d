use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::{data_context::StoreError, message_response::MessageResponse};

/// Failure of a single task operation. Every variant is terminal for the request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("{0}")]
    Validation(String),

    /// The task exists but belongs to someone else.
    #[error("{0}")]
    Forbidden(&'static str),

    #[error("Task not found")]
    NotFound,

    #[error("store: {0}")]
    Infrastructure(String),
}

impl TaskError {
    pub fn status(&self) -> StatusCode {
        match self {
            TaskError::Validation(_) => StatusCode::BAD_REQUEST,
            TaskError::Forbidden(_) => StatusCode::FORBIDDEN,
            TaskError::NotFound => StatusCode::NOT_FOUND,
            TaskError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for TaskError {
    fn from(e: StoreError) -> Self {
        TaskError::Infrastructure(e.to_string())
    }
}

impl IntoResponse for TaskError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            TaskError::Infrastructure(detail) => {
                tracing::error!(%detail, "task operation failed");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(MessageResponse::new(message))).into_response()
    }
}
