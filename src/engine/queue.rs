use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::error;

use crate::error::AppError;
use crate::messaging::TaskQueue;
use crate::models::ride_request::Task;
use crate::observability::metrics::Metrics;

/// In-process delayed queue: each task waits on a tokio timer, then lands on
/// the worker channel.
#[derive(Clone)]
pub struct DelayQueue {
    task_tx: mpsc::Sender<Task>,
    metrics: Metrics,
}

impl DelayQueue {
    pub fn new(queue_size: usize, metrics: Metrics) -> (Self, mpsc::Receiver<Task>) {
        let (task_tx, task_rx) = mpsc::channel(queue_size);
        (Self { task_tx, metrics }, task_rx)
    }
}

#[async_trait]
impl TaskQueue for DelayQueue {
    async fn enqueue(&self, task: Task, delay: Duration) -> Result<(), AppError> {
        if self.task_tx.is_closed() {
            return Err(AppError::Internal(
                "task queue send failed: worker stopped".to_string(),
            ));
        }

        let task_tx = self.task_tx.clone();
        let pending = self.metrics.broadcast_tasks_pending.clone();
        pending.inc();

        tokio::spawn(async move {
            sleep(delay).await;
            pending.dec();

            if let Err(err) = task_tx.send(task).await {
                error!(kind = %err.0.kind, "task dropped: worker channel closed");
            }
        });

        Ok(())
    }
}
