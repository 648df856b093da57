//! Shared fixtures for unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;
use taskhub_core::traits::TokenValidator;

use crate::connection::Connection;
use crate::hub::Hub;
use crate::message::{IncomingMessage, OutgoingMessage};
use crate::metrics::RealtimeMetrics;

/// Accepts tokens of the form `user-<id>`.
#[derive(Debug)]
pub struct StaticValidator;

#[async_trait]
impl TokenValidator for StaticValidator {
    async fn validate(&self, token: &str) -> AppResult<i64> {
        token
            .strip_prefix("user-")
            .and_then(|id| id.parse().ok())
            .ok_or_else(|| AppError::authentication("rejected by test validator"))
    }
}

pub fn connection(
    hub: &Arc<Hub>,
    buffer_size: usize,
) -> (Arc<Connection>, mpsc::Receiver<OutgoingMessage>) {
    Connection::new(
        Arc::clone(hub),
        Arc::new(StaticValidator),
        Arc::new(RealtimeMetrics::new()),
        buffer_size,
        &CancellationToken::new(),
    )
}

/// A connection that completed the handshake as `user_id`, with the ack
/// already drained.
pub async fn authed_connection(
    hub: &Arc<Hub>,
    user_id: i64,
    buffer_size: usize,
) -> (Arc<Connection>, mpsc::Receiver<OutgoingMessage>) {
    let (conn, mut rx) = connection(hub, buffer_size);
    conn.handle_message(IncomingMessage::Auth {
        token: format!("user-{user_id}"),
    })
    .await;
    assert_eq!(rx.try_recv().ok(), Some(OutgoingMessage::auth_success()));
    (conn, rx)
}

/// Everything currently queued.
pub fn drain(rx: &mut mpsc::Receiver<OutgoingMessage>) -> Vec<OutgoingMessage> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}
