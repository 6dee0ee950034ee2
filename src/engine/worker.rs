use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::engine::scheduler::BroadcastScheduler;
use crate::error::AppError;
use crate::messaging::TaskQueue;
use crate::models::ride_request::{Task, TASK_BROADCAST_RIDE};

/// Drains fired tasks and hands them to the scheduler. A failing handler is
/// re-queued until the task's own `max_retry` is spent.
pub async fn run_broadcast_worker(
    scheduler: Arc<BroadcastScheduler>,
    queue: Arc<dyn TaskQueue>,
    retry_delay: Duration,
    mut task_rx: mpsc::Receiver<Task>,
) {
    info!("broadcast worker started");

    while let Some(task) = task_rx.recv().await {
        if task.kind != TASK_BROADCAST_RIDE {
            warn!(kind = %task.kind, "unknown task kind, dropping");
            continue;
        }

        let start = Instant::now();
        match scheduler.handle_task(&task.payload).await {
            Ok(outcome) => {
                info!(
                    outcome = ?outcome,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "broadcast task processed"
                );
            }
            Err(err @ AppError::Validation(_)) => {
                error!(error = %err, "dropping malformed broadcast task");
            }
            Err(err) => retry_or_drop(queue.as_ref(), task, retry_delay, err).await,
        }
    }

    warn!("broadcast worker stopped: task channel closed");
}

async fn retry_or_drop(queue: &dyn TaskQueue, task: Task, retry_delay: Duration, err: AppError) {
    if task.retried >= task.max_retry {
        error!(
            error = %err,
            retried = task.retried,
            "broadcast task failed, retries exhausted"
        );
        return;
    }

    let retried = task.retried + 1;
    warn!(error = %err, retried, "broadcast task failed, retrying");

    let retry = Task { retried, ..task };
    if let Err(enqueue_err) = queue.enqueue(retry, retry_delay).await {
        error!(error = %enqueue_err, "failed to re-queue broadcast task");
    }
}
