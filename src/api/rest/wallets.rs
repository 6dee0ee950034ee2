use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/wallets/v1/:passenger_id/top-up", post(top_up))
}

#[derive(Deserialize)]
pub struct TopUpRequest {
    pub amount: f64,
}

#[derive(Serialize)]
pub struct WalletBalance {
    pub passenger_id: String,
    pub balance: f64,
}

async fn top_up(
    State(state): State<Arc<AppState>>,
    Path(passenger_id): Path<String>,
    Json(payload): Json<TopUpRequest>,
) -> Result<Json<WalletBalance>, AppError> {
    let balance = state.wallets.credit(&passenger_id, payload.amount).await?;

    Ok(Json(WalletBalance {
        passenger_id,
        balance,
    }))
}
