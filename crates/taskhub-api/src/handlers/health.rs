//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let hub = &state.realtime.hub;

    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        ws_connections: hub.connection_count().await,
        online_users: hub.user_count().await,
        realtime: state.realtime.metrics.snapshot(),
    }))
}
