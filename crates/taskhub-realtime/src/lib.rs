//! # taskhub-realtime
//!
//! Real-time push engine for TaskHub. Provides:
//!
//! - WebSocket connections authenticated in-band by the first `auth` message
//! - A per-user [`Hub`] with topic-filtered, best-effort fan-out
//! - Bounded per-connection outbound queues that never block publishers
//! - The bridge from `notification.created` domain events into the hub

pub mod bridge;
pub mod connection;
pub mod error;
pub mod hub;
pub mod message;
pub mod metrics;
pub mod server;

#[cfg(test)]
pub(crate) mod testing;

pub use bridge::NotificationListener;
pub use connection::{Connection, ConnectionId};
pub use hub::Hub;
pub use message::{IncomingMessage, OutgoingMessage};
pub use server::RealtimeEngine;
