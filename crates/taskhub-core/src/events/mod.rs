//! Domain events emitted by the task-management backend.
//!
//! Events are published on the [`EventBus`] and consumed by listeners such
//! as the real-time notification bridge.

pub mod bus;
pub mod notification;
pub mod task;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use bus::EventBus;
pub use notification::NotificationEvent;
pub use task::TaskEvent;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The user who caused the event (if applicable).
    pub actor_id: Option<i64>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// A notification-related event.
    Notification(NotificationEvent),
    /// A task-related event.
    Task(TaskEvent),
}

/// Discriminant used by the bus to route events to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `notification.created`
    NotificationCreated,
    /// `task.updated`
    TaskUpdated,
}

impl EventKind {
    /// Dotted event name as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotificationCreated => "notification.created",
            Self::TaskUpdated => "task.updated",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(actor_id: Option<i64>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor_id,
            payload,
        }
    }

    /// Returns the routing kind of this event.
    pub fn kind(&self) -> EventKind {
        match &self.payload {
            EventPayload::Notification(NotificationEvent::Created { .. }) => {
                EventKind::NotificationCreated
            }
            EventPayload::Task(TaskEvent::Updated { .. }) => EventKind::TaskUpdated,
        }
    }
}
