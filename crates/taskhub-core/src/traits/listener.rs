//! Event bus listener trait.

use async_trait::async_trait;

use crate::events::{DomainEvent, EventKind};
use crate::result::AppResult;

/// A consumer of one kind of domain event.
#[async_trait]
pub trait EventListener: Send + Sync + 'static {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// The event kind this listener is subscribed to.
    fn kind(&self) -> EventKind;

    /// Handles one event of [`Self::kind`].
    async fn handle(&self, event: &DomainEvent) -> AppResult<()>;
}
