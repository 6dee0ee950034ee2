use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;

use crate::engine::coordinator::{CancelResponse, ConfirmResponse, MatchResponse, PickupOffers};
use crate::error::AppError;
use crate::models::order::Order;
use crate::models::route::{Location, RoutePlan};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders/v1/location", post(post_location))
        .route("/orders/v1/find-driver", post(find_driver))
        .route("/orders/v1/confirm", post(confirm_order))
        .route("/orders/v1/cancel", post(cancel_order))
        .route("/orders/v1/:order_id", get(get_order))
        .route("/orders/v1/:order_id/pickup-offers", get(get_pickup_offers))
}

#[derive(Deserialize)]
pub struct LocationRequest {
    pub passenger_id: String,
    pub current_location: Location,
    pub destination: Location,
}

#[derive(Deserialize)]
pub struct FindDriverRequest {
    pub passenger_id: String,
    pub payment_method: String,
}

#[derive(Deserialize)]
pub struct ConfirmOrderRequest {
    pub passenger_id: String,
    pub order_id: String,
    pub driver_id: String,
}

#[derive(Deserialize)]
pub struct CancelOrderRequest {
    pub passenger_id: String,
    pub order_id: String,
}

async fn post_location(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LocationRequest>,
) -> Result<Json<RoutePlan>, AppError> {
    let plan = state
        .coordinator
        .plan_trip(
            &payload.passenger_id,
            payload.current_location,
            payload.destination,
        )
        .await?;

    Ok(Json(plan))
}

async fn find_driver(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<FindDriverRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let response = state
        .coordinator
        .request_match(&payload.passenger_id, &payload.payment_method)
        .await?;

    Ok(Json(response))
}

async fn confirm_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ConfirmOrderRequest>,
) -> Result<Json<ConfirmResponse>, AppError> {
    let response = state
        .coordinator
        .confirm(&payload.order_id, &payload.passenger_id, &payload.driver_id)
        .await?;

    Ok(Json(response))
}

async fn cancel_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CancelOrderRequest>,
) -> Result<Json<CancelResponse>, AppError> {
    let response = state
        .coordinator
        .cancel(&payload.order_id, &payload.passenger_id)
        .await?;

    Ok(Json(response))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> Result<Json<Order>, AppError> {
    let order = state.coordinator.order_detail(&order_id).await?;
    Ok(Json(order))
}

async fn get_pickup_offers(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> Result<Json<PickupOffers>, AppError> {
    let offers = state.coordinator.pickup_offers(&order_id).await?;
    Ok(Json(offers))
}
