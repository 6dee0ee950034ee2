use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::route::RoutePlan;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RideEvent {
    RideRequested {
        event_id: String,
        order_id: String,
        passenger_id: String,
        route_plan: RoutePlan,
        attempt: u32,
        emitted_at: DateTime<Utc>,
    },
    DriverMatched {
        event_id: String,
        order_id: String,
        passenger_id: String,
        driver_id: String,
        route_plan: RoutePlan,
        emitted_at: DateTime<Utc>,
    },
    PassengerPickedUp {
        event_id: String,
        order_id: String,
        passenger_id: String,
        driver_id: String,
        emitted_at: DateTime<Utc>,
    },
    TripCompleted {
        event_id: String,
        order_id: String,
        driver_id: String,
        distance_km: f64,
        duration: String,
        emitted_at: DateTime<Utc>,
    },
    OrderCancelled {
        event_id: String,
        order_id: String,
        passenger_id: String,
        emitted_at: DateTime<Utc>,
    },
}

impl RideEvent {
    pub fn new_event_id(prefix: &str) -> String {
        format!("{prefix}-{}", Uuid::new_v4().simple())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RideEvent::RideRequested { .. } => "ride_requested",
            RideEvent::DriverMatched { .. } => "driver_matched",
            RideEvent::PassengerPickedUp { .. } => "passenger_picked_up",
            RideEvent::TripCompleted { .. } => "trip_completed",
            RideEvent::OrderCancelled { .. } => "order_cancelled",
        }
    }

    /// Partition key for downstream consumers.
    pub fn order_id(&self) -> &str {
        match self {
            RideEvent::RideRequested { order_id, .. }
            | RideEvent::DriverMatched { order_id, .. }
            | RideEvent::PassengerPickedUp { order_id, .. }
            | RideEvent::TripCompleted { order_id, .. }
            | RideEvent::OrderCancelled { order_id, .. } => order_id,
        }
    }

    pub fn event_id(&self) -> &str {
        match self {
            RideEvent::RideRequested { event_id, .. }
            | RideEvent::DriverMatched { event_id, .. }
            | RideEvent::PassengerPickedUp { event_id, .. }
            | RideEvent::TripCompleted { event_id, .. }
            | RideEvent::OrderCancelled { event_id, .. } => event_id,
        }
    }
}
