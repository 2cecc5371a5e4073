use crate::api::error::ApiError;
use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Duration;

/// Fail the request with `408` if the inner service takes longer than `duration`.
pub async fn enforce_timeout(duration: Duration, req: Request, next: Next) -> Response {
    match tokio::time::timeout(duration, next.run(req)).await {
        Ok(res) => res,
        Err(_) => {
            tracing::warn!(timeout_secs = duration.as_secs(), "Request timed out");
            ApiError::Timeout.into_response()
        }
    }
}
