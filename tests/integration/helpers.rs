//! Shared test helpers for integration tests: an in-process server and a
//! small WebSocket client.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use taskhub_api::{AppState, build_router};
use taskhub_auth::{JwtEncoder, JwtTokenValidator, MemoryApiTokenStore};
use taskhub_core::config::AppConfig;
use taskhub_core::events::EventBus;
use taskhub_realtime::RealtimeEngine;

pub type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;
pub type WsTx = SplitSink<WsStream, WsMessage>;
pub type WsRx = SplitStream<WsStream>;

pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// A running server bound to an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub engine: Arc<RealtimeEngine>,
    pub bus: EventBus,
    pub encoder: JwtEncoder,
    pub api_tokens: Arc<MemoryApiTokenStore>,
    pub bridge: JoinHandle<()>,
    server: JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> anyhow::Result<Self> {
        Self::spawn_with(|_| {}).await
    }

    /// Spawns with test defaults, then applies `configure`.
    pub async fn spawn_with(configure: impl FnOnce(&mut AppConfig)) -> anyhow::Result<Self> {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "integration-test-secret".to_string();
        config.realtime.outbound_buffer_size = 16;
        configure(&mut config);

        let api_tokens = Arc::new(MemoryApiTokenStore::new(config.auth.api_token_prefix.clone()));
        let validator = Arc::new(JwtTokenValidator::new(&config.auth, api_tokens.clone()));
        let encoder = JwtEncoder::new(&config.auth);

        let bus = EventBus::new(config.realtime.event_bus_capacity);
        let engine = Arc::new(RealtimeEngine::new(config.realtime.clone(), validator));
        let bridge = engine.attach_bridge(&bus);

        let app = build_router(AppState::new(Arc::new(config), engine.clone()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            engine,
            bus,
            encoder,
            api_tokens,
            bridge,
            server,
        })
    }

    pub fn user_token(&self, user_id: i64) -> anyhow::Result<String> {
        let (token, _) = self.encoder.generate_user_token(user_id, "tester")?;
        Ok(token)
    }

    pub async fn connect(&self) -> anyhow::Result<(WsTx, WsRx)> {
        let url = format!("ws://{}/ws", self.addr);
        let (stream, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| anyhow::anyhow!("ws connect: {e}"))?;
        Ok(stream.split())
    }

    /// Connects, authenticates as `user_id` and subscribes to
    /// `notifications`. Returns once the subscription is in effect.
    pub async fn connect_subscribed(&self, user_id: i64) -> anyhow::Result<(WsTx, WsRx)> {
        let (mut tx, mut rx) = self.connect().await?;

        ws_send(&mut tx, &serde_json::json!({"action": "auth", "token": self.user_token(user_id)?}))
            .await?;
        let ack = ws_recv(&mut rx, RECV_TIMEOUT).await?;
        anyhow::ensure!(ack["action"] == "auth.success", "unexpected ack: {ack}");

        ws_send(&mut tx, &serde_json::json!({"action": "subscribe", "topic": "notifications"}))
            .await?;
        sync(&mut tx, &mut rx).await?;

        Ok((tx, rx))
    }

    /// Resolves once `count` authenticated connections are registered.
    pub async fn wait_for_connections(&self, count: usize) -> anyhow::Result<()> {
        tokio::time::timeout(RECV_TIMEOUT, async {
            while self.engine.hub.connection_count().await != count {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .map_err(|_| anyhow::anyhow!("expected {count} registered connections"))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.engine.shutdown();
        self.server.abort();
    }
}

/// Send a JSON message over the WebSocket.
pub async fn ws_send(stream: &mut WsTx, value: &Value) -> anyhow::Result<()> {
    let text = serde_json::to_string(value)?;
    stream
        .send(WsMessage::Text(text.into()))
        .await
        .map_err(|e| anyhow::anyhow!("ws send: {e}"))
}

/// Send a raw text frame.
pub async fn ws_send_raw(stream: &mut WsTx, text: &str) -> anyhow::Result<()> {
    stream
        .send(WsMessage::Text(text.to_string().into()))
        .await
        .map_err(|e| anyhow::anyhow!("ws send: {e}"))
}

/// Receive a JSON message from the WebSocket with timeout, skipping
/// control frames.
pub async fn ws_recv(stream: &mut WsRx, timeout: Duration) -> anyhow::Result<Value> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let msg = tokio::time::timeout_at(deadline, stream.next())
            .await
            .map_err(|_| anyhow::anyhow!("ws recv timeout"))?
            .ok_or_else(|| anyhow::anyhow!("ws stream closed"))?
            .map_err(|e| anyhow::anyhow!("ws recv: {e}"))?;

        match msg {
            WsMessage::Text(text) => {
                let parsed: Value = serde_json::from_str(&text)?;
                return Ok(parsed);
            }
            WsMessage::Ping(_) | WsMessage::Pong(_) => continue,
            other => anyhow::bail!("expected Text message, got {other:?}"),
        }
    }
}

/// Waits for the server to close the socket. Fails if a data frame arrives
/// first.
pub async fn ws_expect_close(stream: &mut WsRx, timeout: Duration) -> anyhow::Result<()> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let next = tokio::time::timeout_at(deadline, stream.next())
            .await
            .map_err(|_| anyhow::anyhow!("socket not closed within {timeout:?}"))?;

        match next {
            None | Some(Err(_)) | Some(Ok(WsMessage::Close(_))) => return Ok(()),
            Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_))) => continue,
            Some(Ok(other)) => anyhow::bail!("expected close, got {other:?}"),
        }
    }
}

/// Round-trips a rejected subscribe so every earlier frame on this socket is
/// known to have been processed.
pub async fn sync(tx: &mut WsTx, rx: &mut WsRx) -> anyhow::Result<()> {
    ws_send(tx, &serde_json::json!({"action": "subscribe", "topic": "__sync__"})).await?;
    let reply = ws_recv(rx, RECV_TIMEOUT).await?;
    anyhow::ensure!(
        reply == serde_json::json!({"error": "invalid_topic", "topic": "__sync__"}),
        "unexpected sync reply: {reply}"
    );
    Ok(())
}
