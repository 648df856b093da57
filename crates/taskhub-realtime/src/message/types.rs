//! Inbound and outbound WebSocket message type definitions.
//!
//! One JSON object per text frame in both directions.

use serde::{Deserialize, Serialize};

/// Messages sent by the client to the server, tagged by `action`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum IncomingMessage {
    /// In-band handshake carrying a session or API token.
    Auth {
        /// Signed token.
        #[serde(default)]
        token: String,
    },
    /// Subscribe to a topic.
    Subscribe {
        /// Topic name.
        #[serde(default)]
        topic: String,
    },
    /// Unsubscribe from a topic.
    Unsubscribe {
        /// Topic name.
        #[serde(default)]
        topic: String,
    },
    /// Any action this server does not recognise.
    #[serde(other)]
    Unknown,
}

impl IncomingMessage {
    /// Action name for logging.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Auth { .. } => "auth",
            Self::Subscribe { .. } => "subscribe",
            Self::Unsubscribe { .. } => "unsubscribe",
            Self::Unknown => "unknown",
        }
    }
}

/// Messages sent by the server to the client.
///
/// Each variant has a distinct required field, so frames are untagged on the
/// wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutgoingMessage {
    /// A pushed event.
    Event {
        /// Event name, e.g. `notification.created`.
        event: String,
        /// Topic the event was published on.
        topic: String,
        /// Event payload.
        data: serde_json::Value,
    },
    /// Handshake acknowledgement.
    Ack {
        /// Which handshake step succeeded.
        action: AckAction,
        /// Always true when sent.
        success: bool,
    },
    /// Rejection of a client action.
    Error {
        /// Machine-readable error code.
        error: ErrorCode,
        /// The offending topic, when relevant.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        topic: Option<String>,
    },
}

/// Acknowledged handshake actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AckAction {
    /// The `auth` message was accepted.
    #[serde(rename = "auth.success")]
    AuthSuccess,
}

/// Error codes sent to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// A second `auth` on an authenticated connection.
    AlreadyAuthenticated,
    /// The token failed validation; the connection is closed.
    InvalidToken,
    /// Subscribe/unsubscribe before a successful `auth`.
    AuthRequired,
    /// Subscribe to a topic outside the allow-list.
    InvalidTopic,
}

impl OutgoingMessage {
    /// Builds a pushed event.
    pub fn event(
        event: impl Into<String>,
        topic: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self::Event {
            event: event.into(),
            topic: topic.into(),
            data,
        }
    }

    /// Builds the `auth.success` acknowledgement.
    pub fn auth_success() -> Self {
        Self::Ack {
            action: AckAction::AuthSuccess,
            success: true,
        }
    }

    /// Builds an error without a topic.
    pub fn error(code: ErrorCode) -> Self {
        Self::Error {
            error: code,
            topic: None,
        }
    }

    /// Builds an error echoing the offending topic.
    pub fn topic_error(code: ErrorCode, topic: impl Into<String>) -> Self {
        Self::Error {
            error: code,
            topic: Some(topic.into()),
        }
    }
}
