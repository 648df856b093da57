//! `notification.created` → hub fan-out.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use taskhub_core::events::{DomainEvent, EventKind, EventPayload, NotificationEvent};
use taskhub_core::result::AppResult;
use taskhub_core::traits::EventListener;

use crate::hub::Hub;
use crate::message::NOTIFICATIONS_TOPIC;

/// Pushes stored notifications to their recipient's open sockets.
///
/// Delivery is best-effort: users with no subscribed connection simply miss
/// the push and see the notification on their next fetch.
#[derive(Debug)]
pub struct NotificationListener {
    hub: Arc<Hub>,
}

impl NotificationListener {
    /// Create a listener publishing into `hub`.
    pub fn new(hub: Arc<Hub>) -> Self {
        Self { hub }
    }
}

#[async_trait]
impl EventListener for NotificationListener {
    fn name(&self) -> &'static str {
        "realtime.notification_bridge"
    }

    fn kind(&self) -> EventKind {
        EventKind::NotificationCreated
    }

    async fn handle(&self, event: &DomainEvent) -> AppResult<()> {
        let EventPayload::Notification(NotificationEvent::Created {
            user_id,
            notification,
        }) = &event.payload
        else {
            return Ok(());
        };

        let delivered = self
            .hub
            .publish_for_user(
                *user_id,
                NOTIFICATIONS_TOPIC,
                EventKind::NotificationCreated.as_str(),
                notification.clone(),
            )
            .await;

        debug!(event_id = %event.id, user_id, delivered, "Notification pushed");
        Ok(())
    }
}
