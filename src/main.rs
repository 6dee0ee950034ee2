use std::sync::Arc;

use ride_coordinator::api;
use ride_coordinator::config::Config;
use ride_coordinator::engine::worker::run_broadcast_worker;
use ride_coordinator::error::AppError;
use ride_coordinator::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    let retry_delay = config.policy.task_retry_delay;
    let (app_state, task_rx) = AppState::new(
        config.policy.clone(),
        config.task_queue_size,
        config.event_buffer_size,
    );
    let shared_state = Arc::new(app_state);

    tokio::spawn(run_broadcast_worker(
        shared_state.coordinator.scheduler(),
        shared_state.queue.clone(),
        retry_delay,
        task_rx,
    ));

    let app = api::rest::router(shared_state.clone());

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(
        http_port = config.http_port,
        search_radius_km = config.policy.search_radius_km,
        "http server started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
