//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;

use axum::extract::ws::WebSocket;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use taskhub_core::config::RealtimeConfig;
use taskhub_core::events::EventBus;
use taskhub_core::traits::TokenValidator;

use crate::bridge::NotificationListener;
use crate::connection::{self, Connection};
use crate::hub::Hub;
use crate::metrics::RealtimeMetrics;

/// Central real-time engine: owns the hub, accepts upgraded sockets and
/// feeds domain events into the hub.
pub struct RealtimeEngine {
    /// Connection registry and fan-out.
    pub hub: Arc<Hub>,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
    validator: Arc<dyn TokenValidator>,
    config: RealtimeConfig,
    /// Parent of every connection's token.
    shutdown: CancellationToken,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("config", &self.config)
            .field("shutting_down", &self.shutdown.is_cancelled())
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates an engine with an empty hub.
    pub fn new(config: RealtimeConfig, validator: Arc<dyn TokenValidator>) -> Self {
        info!(
            outbound_buffer_size = config.outbound_buffer_size,
            ping_interval_seconds = config.ping_interval_seconds,
            "Real-time engine initialized"
        );

        Self {
            hub: Arc::new(Hub::new()),
            metrics: Arc::new(RealtimeMetrics::new()),
            validator,
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Drives one upgraded socket until it closes.
    ///
    /// The connection starts unauthenticated and only joins the hub after a
    /// valid `auth` message.
    pub async fn accept(&self, socket: WebSocket) {
        self.metrics.connection_opened();

        let (conn, outbound) = Connection::new(
            Arc::clone(&self.hub),
            Arc::clone(&self.validator),
            Arc::clone(&self.metrics),
            self.config.outbound_buffer_size,
            &self.shutdown,
        );

        info!(conn_id = %conn.id, "WebSocket connection opened");

        connection::serve(conn, outbound, socket, &self.config).await;
    }

    /// Subscribes the notification bridge to `bus`.
    ///
    /// The listener stops when the engine shuts down.
    pub fn attach_bridge(&self, bus: &EventBus) -> JoinHandle<()> {
        let listener = Arc::new(NotificationListener::new(Arc::clone(&self.hub)));
        bus.attach(listener, self.shutdown.child_token())
    }

    /// Closes every open connection and stops the bridge.
    pub fn shutdown(&self) {
        info!("Shutting down real-time engine");
        self.shutdown.cancel();
    }
}
