use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::memory::ValidationError;
use crate::persistence::StoreError;

/// Store operation a handler was performing, used to word persistence failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            Self::List => "An error occurred while fetching memories.",
            Self::Get => "An error occurred while fetching the memory.",
            Self::Create => "An error occurred while creating the memory.",
            Self::Update => "An error occurred while updating the memory.",
            Self::Delete => "An error occurred while deleting the memory.",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid memory id: expected a UUID.")]
    InvalidId,

    /// Body was readable JSON but failed field checks.
    #[error("{0}")]
    Validation(String),

    /// Body could not be read as JSON at all.
    #[error("{0}")]
    MalformedBody(String),

    #[error("Memory not found.")]
    NotFound,

    #[error("{}", .0.failure_message())]
    Persistence(Operation),

    #[error("Authentication required.")]
    Unauthorized,

    #[error("Too many requests, slow down.")]
    RateLimited,

    #[error("Request timed out.")]
    Timeout,
}

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: String,
}

impl ApiError {
    /// Map a store failure, logging the underlying cause for anything but not-found.
    pub fn from_store(err: StoreError, operation: Operation) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound,
            other => {
                tracing::error!(
                    operation = %operation,
                    error = %other,
                    "Memory store operation failed"
                );
                Self::Persistence(operation)
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId | Self::MalformedBody(_) => StatusCode::BAD_REQUEST,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidId => "invalid_id",
            Self::Validation(_) | Self::MalformedBody(_) => "validation",
            Self::NotFound => "not_found",
            Self::Persistence(_) => "persistence",
            Self::Unauthorized => "unauthorized",
            Self::RateLimited => "rate_limited",
            Self::Timeout => "timeout",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => Self::Validation(err.body_text()),
            other => Self::MalformedBody(other.body_text()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
            kind: self.kind().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
