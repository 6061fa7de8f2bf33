use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use thiserror::Error;

use super::models::ErrorResponse;
use crate::registry::RegistryError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid task ID: {0}")]
    InvalidTaskId(String),
    #[error("payload invalid: {0}")]
    InvalidPayload(String),
    #[error("payload too large: {0} bytes")]
    PayloadTooLarge(usize),
    #[error("invalid file format: extension {0:?} is not allowed")]
    InvalidFormat(String),
    #[error("no more than {0} files allowed per task")]
    LimitExceeded(usize),
    #[error("server busy: no more than {0} active tasks allowed")]
    CapacityExceeded(usize),
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("archive not ready for task {0}")]
    ArchiveNotReady(String),
    #[error("archive file not found for task {0}")]
    ArchiveMissing(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidTaskId(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::InvalidFormat(_) => StatusCode::BAD_REQUEST,
            ApiError::LimitExceeded(_) => StatusCode::BAD_REQUEST,
            ApiError::CapacityExceeded(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ArchiveNotReady(_) => StatusCode::BAD_REQUEST,
            ApiError::ArchiveMissing(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidTaskId(_) => "INVALID_TASK_ID",
            ApiError::InvalidPayload(_) => "INVALID_PAYLOAD",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::InvalidFormat(_) => "INVALID_FORMAT",
            ApiError::LimitExceeded(_) => "LIMIT_EXCEEDED",
            ApiError::CapacityExceeded(_) => "CAPACITY_EXCEEDED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::ArchiveNotReady(_) => "ARCHIVE_NOT_READY",
            ApiError::ArchiveMissing(_) => "ARCHIVE_MISSING",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = ErrorResponse {
            code: self.code(),
            error: self.to_string(),
        };

        (status, Json(json!(body))).into_response()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        ApiError::InvalidPayload(value.to_string())
    }
}

impl From<RegistryError> for ApiError {
    fn from(value: RegistryError) -> Self {
        match value {
            RegistryError::CapacityExceeded(max) => ApiError::CapacityExceeded(max),
            RegistryError::NotFound(id) => ApiError::NotFound(format!("task {id}")),
            RegistryError::LimitExceeded(max) => ApiError::LimitExceeded(max),
            RegistryError::InvalidFormat(ext) => ApiError::InvalidFormat(ext),
            RegistryError::InvalidTransition { .. } => ApiError::Internal(value.to_string()),
        }
    }
}
