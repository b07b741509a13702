//! # Flowgate API Server
//!
//! REST server for the identity and form-instance resources of the workflow
//! engine.
//!
//! ## Architecture
//!
//! The API server is built with Axum and provides:
//! - Identity user endpoints (list with filters and paging, create, get, update, delete)
//! - Form instance query endpoints
//! - A health endpoint that checks the configured storage backend
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/flowgate cargo run -p flowgate-api
//! STORAGE_BACKEND=memory cargo run -p flowgate-api
//! ```

use flowgate_api::{
    app::{build_router, AppState},
    config::Config,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "flowgate_api=debug,tower_http=debug".into());

    // JSON lines in production, human-readable otherwise
    if config.api.production {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!(
        "Flowgate API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let address = config.bind_address();
    tracing::info!(storage = %config.storage.backend, "Configuration loaded");

    let state = AppState::connect(config).await?;
    let storage = state.storage.clone();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    storage.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
