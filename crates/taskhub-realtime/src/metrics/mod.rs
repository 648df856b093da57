//! Realtime engine metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level metrics counters.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    /// Total connections accepted
    connections_total: AtomicU64,
    /// Connections currently open
    connections_active: AtomicU64,
    /// Frames received from clients
    messages_received: AtomicU64,
    /// Frames written to clients
    messages_sent: AtomicU64,
    /// Messages dropped on a full outbound queue
    messages_dropped: AtomicU64,
    /// Rejected handshakes
    auth_failures: AtomicU64,
}

impl RealtimeMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly accepted connection.
    pub fn connection_opened(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a closed connection.
    pub fn connection_closed(&self) {
        let _ = self
            .connections_active
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    pub fn message_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn message_sent(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn message_dropped(&self) {
        self.messages_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn auth_failed(&self) {
        self.auth_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
            auth_failures: self.auth_failures.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Total connections ever accepted
    pub connections_total: u64,
    /// Currently open connections
    pub connections_active: u64,
    /// Frames received from clients
    pub messages_received: u64,
    /// Frames written to clients
    pub messages_sent: u64,
    /// Messages dropped under backpressure
    pub messages_dropped: u64,
    /// Rejected handshakes
    pub auth_failures: u64,
}
