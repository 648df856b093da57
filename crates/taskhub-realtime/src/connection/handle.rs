//! Per-socket connection state and the in-band protocol handler.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use taskhub_core::traits::TokenValidator;

use crate::hub::Hub;
use crate::message::{ErrorCode, IncomingMessage, OutgoingMessage, is_allowed_topic};
use crate::metrics::RealtimeMetrics;

/// Unique connection identifier
pub type ConnectionId = Uuid;

/// Mutable protocol state, guarded by one lock per connection.
#[derive(Debug, Default)]
struct ConnectionState {
    /// Set exactly once by a successful `auth`.
    user_id: Option<i64>,
    /// Topics this connection receives events for.
    subscriptions: HashSet<String>,
}

/// Outcome of handling one client message.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Keep reading.
    Continue,
    /// Write this frame straight to the socket, then close.
    Close(OutgoingMessage),
}

/// One client session.
///
/// Created unauthenticated when the socket is upgraded. The read task feeds
/// it client messages; the hub and the read task enqueue outbound messages
/// that the write task drains.
pub struct Connection {
    /// Unique connection ID
    pub id: ConnectionId,
    /// When the socket was upgraded
    pub connected_at: DateTime<Utc>,
    /// Auth and subscription state
    state: RwLock<ConnectionState>,
    /// Bounded outbound queue
    sender: mpsc::Sender<OutgoingMessage>,
    /// Shared by the read and write tasks
    cancel: CancellationToken,
    /// Set by the first `release`
    released: AtomicBool,
    hub: Arc<Hub>,
    validator: Arc<dyn TokenValidator>,
    metrics: Arc<RealtimeMetrics>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("connected_at", &self.connected_at)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl Connection {
    /// Creates an unauthenticated connection with an empty outbound queue of
    /// `buffer_size` slots.
    ///
    /// `shutdown` is the engine-wide token; the connection's own token is a
    /// child of it. Returns the connection and the queue's receiving end for
    /// the write task.
    pub fn new(
        hub: Arc<Hub>,
        validator: Arc<dyn TokenValidator>,
        metrics: Arc<RealtimeMetrics>,
        buffer_size: usize,
        shutdown: &CancellationToken,
    ) -> (Arc<Self>, mpsc::Receiver<OutgoingMessage>) {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));

        let conn = Arc::new(Self {
            id: Uuid::new_v4(),
            connected_at: Utc::now(),
            state: RwLock::new(ConnectionState::default()),
            sender,
            cancel: shutdown.child_token(),
            released: AtomicBool::new(false),
            hub,
            validator,
            metrics,
        });

        (conn, receiver)
    }

    /// The authenticated user, if the handshake has completed.
    pub async fn user_id(&self) -> Option<i64> {
        self.state.read().await.user_id
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.user_id.is_some()
    }

    /// Check if subscribed to a topic
    pub async fn is_subscribed(&self, topic: &str) -> bool {
        self.state.read().await.subscriptions.contains(topic)
    }

    /// Current subscriptions, sorted.
    pub async fn subscriptions(&self) -> Vec<String> {
        let mut subs: Vec<String> = self.state.read().await.subscriptions.iter().cloned().collect();
        subs.sort();
        subs
    }

    /// Non-blocking enqueue onto the outbound queue.
    ///
    /// A full queue drops the message. Returns whether it was queued.
    pub fn enqueue(&self, msg: OutgoingMessage) -> bool {
        match self.sender.try_send(msg) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(conn_id = %self.id, "Outbound queue full, dropping message");
                self.metrics.message_dropped();
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!(conn_id = %self.id, "Outbound queue closed, dropping message");
                false
            }
        }
    }

    /// Token cancelled when either task ends or the engine shuts down.
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Signals both tasks to stop.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Final cleanup run by the read task: cancels, then removes the
    /// connection from the hub if it was registered. Only the first call
    /// has any effect.
    pub async fn release(&self) {
        self.close();
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }

        if let Some(user_id) = self.user_id().await {
            self.hub.unregister(self).await;
            info!(conn_id = %self.id, user_id, "Connection released");
        } else {
            debug!(conn_id = %self.id, "Unauthenticated connection released");
        }

        self.metrics.connection_closed();
    }

    pub(crate) fn metrics(&self) -> &RealtimeMetrics {
        &self.metrics
    }

    /// Applies one parsed client message to the protocol state machine.
    pub async fn handle_message(self: &Arc<Self>, msg: IncomingMessage) -> Flow {
        self.metrics.message_received();
        debug!(conn_id = %self.id, action = msg.action(), "Client message received");

        match msg {
            IncomingMessage::Auth { token } => self.handle_auth(&token).await,
            IncomingMessage::Subscribe { topic } => {
                self.handle_subscribe(topic).await;
                Flow::Continue
            }
            IncomingMessage::Unsubscribe { topic } => {
                self.handle_unsubscribe(&topic).await;
                Flow::Continue
            }
            IncomingMessage::Unknown => {
                debug!(conn_id = %self.id, "Ignoring unknown action");
                Flow::Continue
            }
        }
    }

    async fn handle_auth(self: &Arc<Self>, token: &str) -> Flow {
        if self.is_authenticated().await {
            self.enqueue(OutgoingMessage::error(ErrorCode::AlreadyAuthenticated));
            return Flow::Continue;
        }

        let user_id = match self.validator.validate(token).await {
            Ok(user_id) => user_id,
            Err(e) => {
                warn!(conn_id = %self.id, error = %e, "WebSocket authentication failed");
                self.metrics.auth_failed();
                return Flow::Close(OutgoingMessage::error(ErrorCode::InvalidToken));
            }
        };

        // Only the read task authenticates, so the check above cannot go stale.
        self.state.write().await.user_id = Some(user_id);

        self.hub.register(self).await;

        info!(conn_id = %self.id, user_id, "WebSocket connection authenticated");

        self.enqueue(OutgoingMessage::auth_success());
        Flow::Continue
    }

    async fn handle_subscribe(&self, topic: String) {
        let mut state = self.state.write().await;

        if state.user_id.is_none() {
            drop(state);
            self.enqueue(OutgoingMessage::error(ErrorCode::AuthRequired));
            return;
        }

        if !is_allowed_topic(&topic) {
            drop(state);
            debug!(conn_id = %self.id, topic = %topic, "Rejected subscription to unknown topic");
            self.enqueue(OutgoingMessage::topic_error(ErrorCode::InvalidTopic, topic));
            return;
        }

        debug!(conn_id = %self.id, topic = %topic, "Subscribed to topic");
        state.subscriptions.insert(topic);
    }

    async fn handle_unsubscribe(&self, topic: &str) {
        let mut state = self.state.write().await;

        if state.user_id.is_none() {
            drop(state);
            self.enqueue(OutgoingMessage::error(ErrorCode::AuthRequired));
            return;
        }

        if state.subscriptions.remove(topic) {
            debug!(conn_id = %self.id, topic = %topic, "Unsubscribed from topic");
        }
    }
}
