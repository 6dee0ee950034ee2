//! Storage boundaries the coordinator depends on.
//!
//! Every conditional update returns `applied`: `false` means the row was
//! missing or its status no longer matched the expected precondition at write
//! time. Callers read the row first when they need to tell those apart.

pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::driver::{AvailabilityRecord, DriverStatus, GeoHit, GeoPoint};
use crate::models::order::{Order, OrderFilter, OrderStatus};

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts a new order. Fails with `Conflict` when the id is taken or the
    /// passenger already holds an order in `OrderStatus::ACTIVE`: at most one
    /// active order per passenger, enforced at write time.
    async fn create_order(&self, order: Order) -> Result<(), AppError>;

    async fn find_one_order(&self, filter: &OrderFilter) -> Result<Option<Order>, AppError>;

    /// Newest first.
    async fn find_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, AppError>;

    async fn update_status(
        &self,
        order_id: &str,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<bool, AppError>;

    /// Same as `update_status`, additionally fenced on the assigned driver.
    async fn update_status_for_driver(
        &self,
        order_id: &str,
        driver_id: &str,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<bool, AppError>;

    /// Moves a matchable order owned by `passenger_id` to `ACCEPTED`.
    async fn assign_driver(
        &self,
        order_id: &str,
        passenger_id: &str,
        driver_id: &str,
    ) -> Result<bool, AppError>;

    /// Moves an `ON_GOING` order driven by `driver_id` to `COMPLETED`.
    async fn complete_trip(
        &self,
        order_id: &str,
        driver_id: &str,
        distance_km: f64,
        duration: &str,
    ) -> Result<bool, AppError>;

    /// Rewrites a stale matchable order in place, keeping its id. Applies only
    /// while the stored row is still at `expected_revision`.
    async fn supersede_order(
        &self,
        replacement: Order,
        expected_revision: u64,
    ) -> Result<bool, AppError>;
}

/// Radius query over the live driver-location index.
#[async_trait]
pub trait GeoIndex: Send + Sync {
    /// Nearest first.
    async fn within_radius(
        &self,
        center: GeoPoint,
        radius_km: f64,
    ) -> Result<Vec<GeoHit>, AppError>;
}

#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    async fn availability(
        &self,
        driver_id: &str,
    ) -> Result<Option<AvailabilityRecord>, AppError>;

    async fn set_status(&self, driver_id: &str, status: DriverStatus) -> Result<bool, AppError>;

    /// Records a location ping. Unknown drivers are registered as online.
    async fn heartbeat(
        &self,
        driver_id: &str,
        location: GeoPoint,
        seen_at: DateTime<Utc>,
    ) -> Result<AvailabilityRecord, AppError>;
}

#[async_trait]
pub trait Cache: Send + Sync {
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), AppError>;

    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    async fn delete(&self, key: &str) -> Result<(), AppError>;

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, AppError>;
}

#[async_trait]
pub trait WalletStore: Send + Sync {
    async fn balance(&self, passenger_id: &str) -> Result<Option<f64>, AppError>;

    async fn credit(&self, passenger_id: &str, amount: f64) -> Result<f64, AppError>;
}
