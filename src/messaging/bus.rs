use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::AppError;
use crate::messaging::EventPublisher;
use crate::models::event::RideEvent;

/// Fans ride events out to every live subscriber (websocket clients, tests).
#[derive(Clone)]
pub struct BroadcastEventBus {
    tx: broadcast::Sender<RideEvent>,
}

impl BroadcastEventBus {
    pub fn new(buffer_size: usize) -> Self {
        let (tx, _unused_rx) = broadcast::channel(buffer_size);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RideEvent> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl EventPublisher for BroadcastEventBus {
    async fn publish(&self, event: &RideEvent) -> Result<(), AppError> {
        // No subscribers is not a delivery failure.
        let receivers = self.tx.send(event.clone()).unwrap_or(0);
        debug!(
            event_id = event.event_id(),
            order_id = event.order_id(),
            kind = event.kind(),
            receivers,
            "event published"
        );
        Ok(())
    }
}
