use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::application::services::RefreshError;
use crate::domain::RepositoryError;
use crate::infrastructure::convert::JobError;
use crate::infrastructure::generator::GenerationError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("configuration missing")]
    Configuration,
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Conversion(#[from] JobError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("{0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

impl From<RefreshError> for AppError {
    fn from(err: RefreshError) -> Self {
        match err {
            RefreshError::Generation(e) => AppError::Generation(e),
            RefreshError::Store(e) => AppError::Repository(e),
        }
    }
}

/// Adapter that turns an `AppError` into a structured JSON HTTP response.
#[derive(Debug)]
pub struct ApiError(AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::Repository(RepositoryError::NotFound) => {
                StatusCode::NOT_FOUND
            }
            AppError::Configuration
            | AppError::Generation(_)
            | AppError::Conversion(_)
            | AppError::Repository(_)
            | AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
