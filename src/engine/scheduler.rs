use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::engine::policy::MatchingPolicy;
use crate::error::AppError;
use crate::messaging::{EventPublisher, TaskQueue};
use crate::models::event::RideEvent;
use crate::models::order::OrderFilter;
use crate::models::ride_request::{RideRequestPayload, Task, TASK_BROADCAST_RIDE};
use crate::observability::metrics::Metrics;
use crate::store::OrderStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BroadcastOutcome {
    /// Re-published and queued again with the next attempt number.
    Rescheduled { next_attempt: u32 },
    /// Attempt ceiling reached; nothing published, nothing queued.
    Abandoned,
    /// The order left matching (or vanished); the task is discarded.
    Superseded,
}

impl BroadcastOutcome {
    fn label(&self) -> &'static str {
        match self {
            BroadcastOutcome::Rescheduled { .. } => "rescheduled",
            BroadcastOutcome::Abandoned => "abandoned",
            BroadcastOutcome::Superseded => "superseded",
        }
    }
}

pub fn ride_requested_event(payload: &RideRequestPayload) -> RideEvent {
    RideEvent::RideRequested {
        event_id: RideEvent::new_event_id("ride_request"),
        order_id: payload.order_temp_id.clone(),
        passenger_id: payload.passenger_id.clone(),
        route_plan: payload.route_plan.clone(),
        attempt: payload.attempt,
        emitted_at: Utc::now(),
    }
}

/// Re-announces unmatched rides on a fixed cadence.
///
/// The only fence is the order's current status: repeated firings of a
/// superseded or abandoned task are no-ops, so at-least-once delivery from
/// the queue is safe.
pub struct BroadcastScheduler {
    orders: Arc<dyn OrderStore>,
    publisher: Arc<dyn EventPublisher>,
    queue: Arc<dyn TaskQueue>,
    policy: MatchingPolicy,
    metrics: Metrics,
}

impl BroadcastScheduler {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        publisher: Arc<dyn EventPublisher>,
        queue: Arc<dyn TaskQueue>,
        policy: MatchingPolicy,
        metrics: Metrics,
    ) -> Self {
        Self {
            orders,
            publisher,
            queue,
            policy,
            metrics,
        }
    }

    /// Queues the first broadcast task for a freshly requested ride.
    pub async fn schedule_first(&self, payload: &RideRequestPayload) -> Result<(), AppError> {
        let mut first = payload.clone();
        first.attempt = first.attempt.max(1);
        self.enqueue(&first, self.policy.first_task_max_retry).await
    }

    /// Entry point for the task queue, fed the serialized payload.
    pub async fn handle_task(&self, raw: &[u8]) -> Result<BroadcastOutcome, AppError> {
        let payload: RideRequestPayload = serde_json::from_slice(raw).map_err(|err| {
            AppError::Validation(format!("malformed ride request payload: {err}"))
        })?;
        self.handle(payload).await
    }

    pub async fn handle(&self, payload: RideRequestPayload) -> Result<BroadcastOutcome, AppError> {
        let outcome = self.fire(&payload).await?;
        self.metrics
            .broadcasts_total
            .with_label_values(&[outcome.label()])
            .inc();
        Ok(outcome)
    }

    async fn fire(&self, payload: &RideRequestPayload) -> Result<BroadcastOutcome, AppError> {
        let order = self
            .orders
            .find_one_order(&OrderFilter::by_id(&payload.order_temp_id))
            .await?;

        match order {
            Some(order) if order.status.is_matchable() => {}
            Some(order) => {
                info!(
                    order_id = %payload.order_temp_id,
                    status = %order.status,
                    "order already left matching, dropping broadcast"
                );
                return Ok(BroadcastOutcome::Superseded);
            }
            None => {
                warn!(order_id = %payload.order_temp_id, "broadcast for unknown order, dropping");
                return Ok(BroadcastOutcome::Superseded);
            }
        }

        if payload.attempt >= self.policy.broadcast_max_attempts {
            info!(
                order_id = %payload.order_temp_id,
                attempt = payload.attempt,
                "max broadcast attempts reached, giving up"
            );
            return Ok(BroadcastOutcome::Abandoned);
        }

        self.publisher.publish(&ride_requested_event(payload)).await?;

        let next = RideRequestPayload {
            attempt: payload.attempt + 1,
            ..payload.clone()
        };
        self.enqueue(&next, self.policy.successor_task_max_retry).await?;

        info!(
            order_id = %payload.order_temp_id,
            attempt = payload.attempt,
            next_attempt = next.attempt,
            "ride re-broadcast"
        );
        Ok(BroadcastOutcome::Rescheduled {
            next_attempt: next.attempt,
        })
    }

    async fn enqueue(&self, payload: &RideRequestPayload, max_retry: u32) -> Result<(), AppError> {
        let body = serde_json::to_vec(payload)?;
        self.queue
            .enqueue(
                Task::new(TASK_BROADCAST_RIDE, body, max_retry),
                self.policy.broadcast_delay,
            )
            .await
    }
}
