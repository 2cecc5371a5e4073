use anyhow::Context;
use axum::{
    Router,
    extract::{DefaultBodyLimit, Request},
    middleware::{self, Next},
};
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use tracing::info;

use crate::AppState;
use crate::api;
use crate::config::{AppConfig, PersistenceProvider};
use crate::middleware::{request_id::add_request_id, timeout::enforce_timeout};
use crate::persistence::{
    MemoryStore,
    providers::{memory::InMemoryProvider, postgres::PostgresProvider},
};
use crate::security::{
    identity::{ClaimsIdentity, IdentityResolver},
    middleware::auth_middleware,
    rate_limit::rate_limit_middleware,
};

/// Request bodies are a few kilobytes of text at most.
const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let store = connect_store(&config).await?;

    let identity: Arc<dyn IdentityResolver> =
        Arc::new(ClaimsIdentity::new(config.security.default_user()));

    let state = AppState::new(store, identity, Arc::clone(&config));
    let app = build_app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(
        name: "server.started",
        address = %addr,
        base_path = %config.server.base_path,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Initialize persistence based on config.
async fn connect_store(config: &AppConfig) -> anyhow::Result<Arc<dyn MemoryStore>> {
    let store: Arc<dyn MemoryStore> = match config.persistence.provider {
        PersistenceProvider::Postgres => {
            let provider = PostgresProvider::new(
                &config.persistence.database_url,
                config.persistence.max_connections,
            )
            .await
            .context("failed to initialize Postgres")?;

            if let Some(user_id) = config.security.default_user() {
                provider
                    .ensure_user(user_id, "Default user")
                    .await
                    .context("failed to ensure default user")?;
                info!(user_id = %user_id, "Default user ensured.");
            }
            Arc::new(provider)
        }
        PersistenceProvider::Memory => Arc::new(InMemoryProvider::new()),
    };

    info!(
        name: "persistence.ready",
        provider = ?config.persistence.provider,
        "Persistence ready"
    );
    Ok(store)
}

/// Build the full router, layers included, around `state`.
pub fn build_app(state: AppState) -> Router {
    let timeout_duration = state.config.resilience.request_timeout();
    let base_path = state.config.server.base_path.clone();

    let protected = api::router().layer(middleware::from_fn_with_state(
        state.clone(),
        auth_middleware,
    ));
    let routes = api::public_router().merge(protected);

    let app = if base_path.is_empty() {
        routes
    } else {
        Router::new().nest(&base_path, routes)
    };

    app.layer(middleware::from_fn_with_state(
        state.clone(),
        rate_limit_middleware,
    ))
    .layer(middleware::from_fn(move |req: Request, next: Next| {
        enforce_timeout(timeout_duration, req, next)
    }))
    .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
    .layer(TraceLayer::new_for_http())
    .layer(middleware::from_fn(add_request_id))
    .layer(CorsLayer::permissive())
    .with_state(state)
}
