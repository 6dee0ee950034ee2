pub mod bus;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::event::RideEvent;
use crate::models::ride_request::Task;

/// At-least-once delivery of ride events, keyed by order id.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &RideEvent) -> Result<(), AppError>;
}

/// "Run this task again after `delay`", with the task's own retry budget.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    async fn enqueue(&self, task: Task, delay: Duration) -> Result<(), AppError>;
}
