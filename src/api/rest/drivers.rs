use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{patch, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;

use crate::engine::coordinator::{CompletionReceipt, PickupOffer};
use crate::error::AppError;
use crate::models::driver::{AvailabilityRecord, DriverStatus, GeoPoint};
use crate::models::order::Order;
use crate::state::AppState;
use crate::store::AvailabilityStore;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/drivers/v1/pickup-offer", post(offer_pickup))
        .route("/drivers/v1/pickup", post(pickup_passenger))
        .route("/drivers/v1/complete", post(complete_trip))
        .route("/drivers/v1/:driver_id/location", patch(update_location))
        .route("/drivers/v1/:driver_id/status", patch(update_status))
}

#[derive(Deserialize)]
pub struct DriverOrderRequest {
    pub driver_id: String,
    pub order_id: String,
}

#[derive(Deserialize)]
pub struct CompleteTripRequest {
    pub driver_id: String,
    pub order_id: String,
    pub distance_km: f64,
}

#[derive(Deserialize)]
pub struct UpdateLocationRequest {
    pub location: GeoPoint,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: DriverStatus,
}

async fn offer_pickup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DriverOrderRequest>,
) -> Result<Json<PickupOffer>, AppError> {
    let offer = state
        .coordinator
        .offer_pickup(&payload.order_id, &payload.driver_id)
        .await?;

    Ok(Json(offer))
}

async fn pickup_passenger(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DriverOrderRequest>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .coordinator
        .pick_up(&payload.order_id, &payload.driver_id)
        .await?;

    Ok(Json(order))
}

async fn complete_trip(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CompleteTripRequest>,
) -> Result<Json<CompletionReceipt>, AppError> {
    let receipt = state
        .coordinator
        .complete(&payload.order_id, &payload.driver_id, payload.distance_km)
        .await?;

    Ok(Json(receipt))
}

async fn update_location(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
    Json(payload): Json<UpdateLocationRequest>,
) -> Result<Json<AvailabilityRecord>, AppError> {
    if driver_id.trim().is_empty() {
        return Err(AppError::Validation("driver_id is required".to_string()));
    }
    if !payload.location.is_valid() {
        return Err(AppError::Validation(
            "location coordinates are out of range".to_string(),
        ));
    }

    let record = state
        .drivers
        .heartbeat(&driver_id, payload.location, Utc::now())
        .await?;

    Ok(Json(record))
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<AvailabilityRecord>, AppError> {
    if !state.drivers.set_status(&driver_id, payload.status).await? {
        return Err(AppError::NotFound(format!("driver {driver_id} not found")));
    }

    let record = state
        .drivers
        .availability(&driver_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("driver {driver_id} not found")))?;

    Ok(Json(record))
}
