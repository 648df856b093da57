//! WebSocket wire message types and topic allow-list.

pub mod topic;
pub mod types;

pub use topic::{NOTIFICATIONS_TOPIC, is_allowed_topic};
pub use types::{AckAction, ErrorCode, IncomingMessage, OutgoingMessage};
