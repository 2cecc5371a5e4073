//! Memories Server
//!
//! Entry point: loads configuration, initializes logging and serves the API.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use dotenvy::dotenv;
use tracing::info;

use memories_server::{config::AppConfig, server, telemetry};

#[tokio::main]
async fn main() {
    // Load .env (if present) before anything reads the environment
    let _ = dotenv();

    // Initialize tracing (M-LOG-STRUCTURED)
    telemetry::init();

    let config = match AppConfig::load().and_then(|config| config.validate().map(|()| config)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    info!(
        name: "config.loaded",
        provider = ?config.persistence.provider,
        port = config.server.port,
        jwt_required = config.security.jwt_required,
        rate_limit_enabled = config.resilience.rate_limit_enabled,
        "Configuration loaded"
    );

    if let Err(e) = server::start_server(Arc::new(config)).await {
        tracing::error!(error = ?e, "Server terminated");
        std::process::exit(1);
    }
}
