use crate::AppState;
use crate::api::error::ApiError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use std::fmt;
use std::num::NonZeroU32;

/// Global token bucket shared by every request.
///
/// Not keyed by client: IP extraction needs `ConnectInfo`, and one bucket is
/// enough to protect the database pool.
pub struct AppRateLimiter {
    limiter: DefaultDirectRateLimiter,
    requests_per_second: NonZeroU32,
    burst_size: NonZeroU32,
}

impl AppRateLimiter {
    /// Zero values are clamped to one.
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        let requests_per_second = NonZeroU32::new(requests_per_second).unwrap_or(nonzero!(1u32));
        let burst_size = NonZeroU32::new(burst_size).unwrap_or(nonzero!(1u32));
        let quota = Quota::per_second(requests_per_second).allow_burst(burst_size);

        Self {
            limiter: RateLimiter::direct(quota),
            requests_per_second,
            burst_size,
        }
    }

    /// Take one token, returning `false` if the bucket is empty.
    pub fn check(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl fmt::Debug for AppRateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppRateLimiter")
            .field("requests_per_second", &self.requests_per_second)
            .field("burst_size", &self.burst_size)
            .finish_non_exhaustive()
    }
}

/// Middleware to enforce rate limits
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if state.config.resilience.rate_limit_enabled && !state.rate_limiter.check() {
        tracing::warn!(path = %req.uri().path(), "Rate limit exceeded");
        return Err(ApiError::RateLimited);
    }
    Ok(next.run(req).await)
}
