use serde::{Deserialize, Serialize};

use crate::models::route::RoutePlan;

pub const TASK_BROADCAST_RIDE: &str = "passenger:request-ride";

/// The unit of broadcast retry. Owned by the scheduler until the order leaves
/// matching or the attempt ceiling is reached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RideRequestPayload {
    pub order_temp_id: String,
    pub passenger_id: String,
    pub route_plan: RoutePlan,
    pub attempt: u32,
}

/// Generic delayed task as handed to a queue backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub kind: String,
    pub payload: Vec<u8>,
    pub max_retry: u32,
    #[serde(default)]
    pub retried: u32,
}

impl Task {
    pub fn new(kind: &str, payload: Vec<u8>, max_retry: u32) -> Self {
        Self {
            kind: kind.to_string(),
            payload,
            max_retry,
            retried: 0,
        }
    }
}
