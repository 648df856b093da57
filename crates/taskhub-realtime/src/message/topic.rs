//! Subscribable topics.

/// Topic carrying user notifications.
pub const NOTIFICATIONS_TOPIC: &str = "notifications";

/// Every topic a client may subscribe to.
pub const ALLOWED_TOPICS: &[&str] = &[NOTIFICATIONS_TOPIC];

/// Returns true if `topic` is on the allow-list.
pub fn is_allowed_topic(topic: &str) -> bool {
    ALLOWED_TOPICS.contains(&topic)
}
