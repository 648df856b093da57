//! In-process domain event bus.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::DomainEvent;
use crate::traits::EventListener;

/// Broadcast bus carrying [`DomainEvent`]s to registered listeners.
///
/// Events published while no listener is attached are dropped.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Creates a bus that buffers up to `capacity` events per listener.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event, returning the number of listeners that will see it.
    pub fn publish(&self, event: DomainEvent) -> usize {
        let kind = event.kind();
        match self.tx.send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                debug!(kind = %kind, "No listeners attached, event dropped");
                0
            }
        }
    }

    /// Returns a raw receiver for every event on the bus.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }

    /// Attaches a listener and drives it on a spawned task until `shutdown`
    /// fires or the bus is dropped.
    ///
    /// Only events whose kind matches [`EventListener::kind`] are handed to
    /// the listener. Handler errors are logged and do not stop the loop.
    pub fn attach(
        &self,
        listener: Arc<dyn EventListener>,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        let mut rx = self.tx.subscribe();
        let kind = listener.kind();

        info!(listener = listener.name(), kind = %kind, "Event listener attached");

        tokio::spawn(async move {
            loop {
                let received = tokio::select! {
                    _ = shutdown.cancelled() => break,
                    received = rx.recv() => received,
                };

                match received {
                    Ok(event) => {
                        if event.kind() != kind {
                            continue;
                        }
                        if let Err(e) = listener.handle(&event).await {
                            warn!(
                                listener = listener.name(),
                                event_id = %event.id,
                                error = %e,
                                "Event listener failed"
                            );
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(listener = listener.name(), skipped, "Event listener lagged, events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            debug!(listener = listener.name(), "Event listener stopped");
        })
    }
}
