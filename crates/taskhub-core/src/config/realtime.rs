//! Real-time WebSocket engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Capacity of each connection's outbound queue.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer_size: usize,
    /// WebSocket ping interval in seconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// Upper bound on any single socket write, pings included.
    #[serde(default = "default_write_timeout")]
    pub write_timeout_seconds: u64,
    /// Capacity of the in-process domain event bus.
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            outbound_buffer_size: default_outbound_buffer(),
            ping_interval_seconds: default_ping_interval(),
            write_timeout_seconds: default_write_timeout(),
            event_bus_capacity: default_event_bus_capacity(),
        }
    }
}

impl RealtimeConfig {
    /// Ping interval as a [`Duration`].
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_seconds.max(1))
    }

    /// Write timeout as a [`Duration`].
    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_seconds)
    }
}

fn default_outbound_buffer() -> usize {
    64
}

fn default_ping_interval() -> u64 {
    30
}

fn default_write_timeout() -> u64 {
    10
}

fn default_event_bus_capacity() -> usize {
    256
}
