//! Route definitions for the TaskHub push service.

use axum::{Router, middleware as axum_middleware, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new().route("/health", get(handlers::health::health));

    let ws_routes = Router::new().route("/ws", get(handlers::ws::ws_upgrade));

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .fallback(handlers::fallback::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}
