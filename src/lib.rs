//! Memories Server
//!
//! A CRUD backend for journal-style "memories": a piece of text, a cover
//! image and a visibility flag, owned by one user.
//!
//! # Architecture
//!
//! - **Server**: Axum HTTP server with auth, rate limiting and timeouts
//! - **Persistence**: `MemoryStore` trait backed by PostgreSQL (sqlx) or memory
//! - **Identity**: pluggable resolver deciding who owns a write
//!
//! # Modules
//!
//! - [`api`]: HTTP handlers and the typed API error
//! - [`config`]: layered configuration (defaults, file, env, CLI)
//! - [`domain`]: the `Memory` entity and its request/response shapes
//! - [`persistence`]: store trait and providers
//! - [`security`]: JWT middleware, identity resolution, rate limiting

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod api;
pub mod config;
pub mod domain;
pub mod middleware;
pub mod persistence;
pub mod security;
pub mod server;
pub mod telemetry;

use crate::config::AppConfig;
use crate::persistence::MemoryStore;
use crate::security::identity::IdentityResolver;
use crate::security::rate_limit::AppRateLimiter;
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Memory store (Postgres or in-process).
    pub store: Arc<dyn MemoryStore>,
    /// Decides which user owns a write.
    pub identity: Arc<dyn IdentityResolver>,
    /// Global Rate Limiter
    pub rate_limiter: Arc<AppRateLimiter>,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn MemoryStore>,
        identity: Arc<dyn IdentityResolver>,
        config: Arc<AppConfig>,
    ) -> Self {
        let rate_limiter = Arc::new(AppRateLimiter::new(
            config.resilience.requests_per_second,
            config.resilience.burst_size,
        ));
        Self {
            store,
            identity,
            rate_limiter,
            config,
        }
    }
}
