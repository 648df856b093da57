//! TaskHub push server
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use taskhub_api::{AppState, build_router};
use taskhub_auth::{JwtTokenValidator, MemoryApiTokenStore};
use taskhub_core::config::AppConfig;
use taskhub_core::error::AppError;
use taskhub_core::events::EventBus;
use taskhub_realtime::RealtimeEngine;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("TASKHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting TaskHub push v{}", env!("CARGO_PKG_VERSION"));

    // ── Auth ─────────────────────────────────────────────────────
    let api_tokens = Arc::new(MemoryApiTokenStore::new(config.auth.api_token_prefix.clone()));
    let validator = Arc::new(JwtTokenValidator::new(&config.auth, api_tokens));

    // ── Realtime engine + notification bridge ────────────────────
    let bus = EventBus::new(config.realtime.event_bus_capacity);
    let engine = Arc::new(RealtimeEngine::new(config.realtime.clone(), validator));
    let bridge = engine.attach_bridge(&bus);

    // ── HTTP server ──────────────────────────────────────────────
    let bind_address = config.server.bind_address();
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let state = AppState::new(Arc::new(config), Arc::clone(&engine));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {bind_address}: {e}")))?;

    tracing::info!(address = %bind_address, "Server listening");

    // Upgraded sockets outlive the HTTP connection, so they are closed by the
    // engine rather than by axum's graceful shutdown.
    let shutdown_engine = Arc::clone(&engine);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
            shutdown_engine.shutdown();
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Drain ────────────────────────────────────────────────────
    if tokio::time::timeout(grace, wait_for_drain(&engine)).await.is_err() {
        tracing::warn!(
            remaining = engine.hub.connection_count().await,
            "Grace period elapsed with connections still open"
        );
    }
    let _ = tokio::time::timeout(grace, bridge).await;

    tracing::info!("TaskHub push server shut down gracefully");
    Ok(())
}

/// Resolves once every authenticated connection has left the hub.
async fn wait_for_drain(engine: &RealtimeEngine) {
    while engine.hub.connection_count().await > 0 {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
