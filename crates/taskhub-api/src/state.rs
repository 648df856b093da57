//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use taskhub_core::config::AppConfig;
use taskhub_realtime::RealtimeEngine;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// WebSocket realtime engine
    pub realtime: Arc<RealtimeEngine>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, realtime: Arc<RealtimeEngine>) -> Self {
        Self {
            config,
            realtime,
            started_at: Instant::now(),
        }
    }
}
