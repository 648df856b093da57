//! Process-wide registry of authenticated connections, indexed by user ID.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::connection::Connection;
use crate::message::OutgoingMessage;

/// Registry and fan-out engine for push messages.
///
/// One user may hold many connections (tabs, devices). Register and
/// unregister take the registry lock exclusively; publishes share it and
/// may run concurrently.
#[derive(Debug, Default)]
pub struct Hub {
    /// User ID → connections in registration order.
    connections: RwLock<HashMap<i64, Vec<Arc<Connection>>>>,
}

impl Hub {
    /// Creates an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an authenticated connection under its user ID.
    ///
    /// Connections that have not authenticated are ignored.
    pub async fn register(&self, conn: &Arc<Connection>) {
        let Some(user_id) = conn.user_id().await else {
            debug!(conn_id = %conn.id, "Refusing to register unauthenticated connection");
            return;
        };

        self.connections
            .write()
            .await
            .entry(user_id)
            .or_default()
            .push(Arc::clone(conn));

        debug!(conn_id = %conn.id, user_id, "Connection registered");
    }

    /// Removes exactly this connection. Idempotent.
    pub async fn unregister(&self, conn: &Connection) {
        let Some(user_id) = conn.user_id().await else {
            return;
        };

        let mut connections = self.connections.write().await;
        if let Some(list) = connections.get_mut(&user_id) {
            let before = list.len();
            list.retain(|c| c.id != conn.id);
            if list.len() < before {
                debug!(conn_id = %conn.id, user_id, "Connection unregistered");
            }
            if list.is_empty() {
                connections.remove(&user_id);
            }
        }
    }

    /// Pushes an event to every connection of `user_id` subscribed to
    /// `topic`.
    ///
    /// Never blocks on a slow consumer: a full queue drops the message for
    /// that connection only. Returns how many connections it was queued to.
    pub async fn publish_for_user(
        &self,
        user_id: i64,
        topic: &str,
        event: &str,
        payload: serde_json::Value,
    ) -> usize {
        let connections = self.connections.read().await;
        let Some(list) = connections.get(&user_id) else {
            trace!(user_id, topic, event, "No connections for user");
            return 0;
        };

        let mut delivered = 0;
        for conn in list {
            if !conn.is_subscribed(topic).await {
                continue;
            }
            if conn.enqueue(OutgoingMessage::event(event, topic, payload.clone())) {
                delivered += 1;
            }
        }

        debug!(user_id, topic, event, delivered, "Published event");
        delivered
    }

    /// Returns the total number of registered connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.values().map(Vec::len).sum()
    }

    /// Returns the number of distinct connected users.
    pub async fn user_count(&self) -> usize {
        self.connections.read().await.len()
    }
}
