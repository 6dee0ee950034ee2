use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::route::RoutePlan;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Requested,
    Matching,
    Accepted,
    OnGoing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ACTIVE: [OrderStatus; 4] = [
        OrderStatus::Requested,
        OrderStatus::Matching,
        OrderStatus::Accepted,
        OrderStatus::OnGoing,
    ];

    pub const MATCHABLE: [OrderStatus; 2] = [OrderStatus::Requested, OrderStatus::Matching];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Requested => "REQUESTED",
            OrderStatus::Matching => "MATCHING",
            OrderStatus::Accepted => "ACCEPTED",
            OrderStatus::OnGoing => "ON_GOING",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Still waiting for a driver to be confirmed.
    pub fn is_matchable(&self) -> bool {
        matches!(self, OrderStatus::Requested | OrderStatus::Matching)
    }

    pub fn is_cancellable(&self) -> bool {
        matches!(
            self,
            OrderStatus::Requested | OrderStatus::Matching | OrderStatus::Accepted
        )
    }

    /// The lifecycle graph. Anything not listed here is illegal.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;

        matches!(
            (self, next),
            (Requested, Matching)
                | (Requested, Accepted)
                | (Matching, Accepted)
                | (Accepted, OnGoing)
                | (OnGoing, Completed)
                | (Requested, Cancelled)
                | (Matching, Cancelled)
                | (Accepted, Cancelled)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Wallet,
    Cash,
    Qris,
}

impl FromStr for PaymentMethod {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "WALLET" | "EWALLET" => Ok(PaymentMethod::Wallet),
            "CASH" => Ok(PaymentMethod::Cash),
            "QRIS" | "QR" => Ok(PaymentMethod::Qris),
            other => Err(AppError::Validation(format!(
                "invalid payment method {other:?}, expected wallet, cash or qris"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub passenger_id: String,
    pub driver_id: Option<String>,
    pub route_plan: RoutePlan,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub distance_actual_km: Option<f64>,
    pub trip_duration: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bumped by every applied write; guards in-place rewrites.
    #[serde(default)]
    pub revision: u64,
}

impl Order {
    pub fn new(
        order_id: String,
        passenger_id: String,
        route_plan: RoutePlan,
        payment_method: PaymentMethod,
    ) -> Self {
        let now = Utc::now();
        Self {
            order_id,
            passenger_id,
            driver_id: None,
            route_plan,
            payment_method,
            payment_status: PaymentStatus::Unpaid,
            status: OrderStatus::Requested,
            distance_actual_km: None,
            trip_duration: None,
            created_at: now,
            updated_at: now,
            revision: 0,
        }
    }
}

/// Predicates for order lookups. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub order_id: Option<String>,
    pub passenger_id: Option<String>,
    pub driver_id: Option<String>,
    pub status_in: Vec<OrderStatus>,
}

impl OrderFilter {
    pub fn by_id(order_id: &str) -> Self {
        Self {
            order_id: Some(order_id.to_string()),
            ..Self::default()
        }
    }

    pub fn passenger(mut self, passenger_id: &str) -> Self {
        self.passenger_id = Some(passenger_id.to_string());
        self
    }

    pub fn driver(mut self, driver_id: &str) -> Self {
        self.driver_id = Some(driver_id.to_string());
        self
    }

    pub fn status_in(mut self, statuses: &[OrderStatus]) -> Self {
        self.status_in = statuses.to_vec();
        self
    }

    pub fn matches(&self, order: &Order) -> bool {
        self.order_id
            .as_deref()
            .map_or(true, |id| order.order_id == id)
            && self
                .passenger_id
                .as_deref()
                .map_or(true, |id| order.passenger_id == id)
            && self
                .driver_id
                .as_deref()
                .map_or(true, |id| order.driver_id.as_deref() == Some(id))
            && (self.status_in.is_empty() || self.status_in.contains(&order.status))
    }
}

/// Live trip tracking record written by the telemetry producer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripTracker {
    pub order_id: String,
    #[serde(default)]
    pub driver_id: String,
    pub updated_at: DateTime<Utc>,
}
