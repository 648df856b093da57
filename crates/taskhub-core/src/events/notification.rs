//! Notification-related domain events.

use serde::{Deserialize, Serialize};

/// Events related to user notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NotificationEvent {
    /// A notification was stored for a user.
    Created {
        /// The recipient.
        user_id: i64,
        /// The notification body as rendered for clients.
        notification: serde_json::Value,
    },
}
