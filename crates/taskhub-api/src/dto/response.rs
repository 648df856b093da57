//! Response DTOs.

use serde::{Deserialize, Serialize};

use taskhub_realtime::metrics::MetricsSnapshot;

/// Standard API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
    /// Uptime.
    pub uptime_seconds: u64,
    /// Authenticated WebSocket connections.
    pub ws_connections: usize,
    /// Users with at least one authenticated connection.
    pub online_users: usize,
    /// Engine counters.
    pub realtime: MetricsSnapshot,
}
