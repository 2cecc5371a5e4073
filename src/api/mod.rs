pub mod error;
pub mod health;
pub mod memories;

use axum::{Router, routing::get};

use crate::AppState;

/// Routes that go through authentication.
pub fn router() -> Router<AppState> {
    memories::build_router()
}

/// Routes reachable without credentials.
pub fn public_router() -> Router<AppState> {
    Router::new().route("/health", get(health::health_check))
}
