//! DashMap-backed collaborators. A `get_mut` holds the shard lock across the
//! read-check-write, which is what makes the conditional updates atomic.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::time::Instant;

use crate::error::AppError;
use crate::geo::haversine_km;
use crate::models::driver::{AvailabilityRecord, DriverStatus, GeoHit, GeoPoint};
use crate::models::order::{Order, OrderFilter, OrderStatus};
use crate::store::{AvailabilityStore, Cache, GeoIndex, OrderStore, WalletStore};

#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: DashMap<String, Order>,
    // Entry lock per passenger, held across the active-order check and insert.
    passengers: DashMap<String, ()>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Applies `change` if the stored row passes `guard`.
    fn conditional_update<G, F>(&self, order_id: &str, guard: G, change: F) -> bool
    where
        G: FnOnce(&Order) -> bool,
        F: FnOnce(&mut Order),
    {
        let Some(mut order) = self.orders.get_mut(order_id) else {
            return false;
        };

        if !guard(&order) {
            return false;
        }

        change(&mut order);
        order.updated_at = Utc::now();
        order.revision += 1;
        true
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create_order(&self, order: Order) -> Result<(), AppError> {
        let _passenger = self.passengers.entry(order.passenger_id.clone()).or_default();

        let active = self.orders.iter().any(|existing| {
            existing.passenger_id == order.passenger_id
                && OrderStatus::ACTIVE.contains(&existing.status)
        });
        if active {
            return Err(AppError::Conflict(format!(
                "passenger {} already has an active order",
                order.passenger_id
            )));
        }

        match self.orders.entry(order.order_id.clone()) {
            Entry::Occupied(_) => Err(AppError::Conflict(format!(
                "order {} already exists",
                order.order_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(order);
                Ok(())
            }
        }
    }

    async fn find_one_order(&self, filter: &OrderFilter) -> Result<Option<Order>, AppError> {
        if let Some(order_id) = filter.order_id.as_deref() {
            return Ok(self
                .orders
                .get(order_id)
                .filter(|entry| filter.matches(entry.value()))
                .map(|entry| entry.value().clone()));
        }

        Ok(self.find_orders(filter).await?.into_iter().next())
    }

    async fn find_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, AppError> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn update_status(
        &self,
        order_id: &str,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<bool, AppError> {
        Ok(self.conditional_update(
            order_id,
            |order| order.status == expected,
            |order| order.status = next,
        ))
    }

    async fn update_status_for_driver(
        &self,
        order_id: &str,
        driver_id: &str,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<bool, AppError> {
        Ok(self.conditional_update(
            order_id,
            |order| order.status == expected && order.driver_id.as_deref() == Some(driver_id),
            |order| order.status = next,
        ))
    }

    async fn assign_driver(
        &self,
        order_id: &str,
        passenger_id: &str,
        driver_id: &str,
    ) -> Result<bool, AppError> {
        Ok(self.conditional_update(
            order_id,
            |order| order.passenger_id == passenger_id && order.status.is_matchable(),
            |order| {
                order.status = OrderStatus::Accepted;
                order.driver_id = Some(driver_id.to_string());
            },
        ))
    }

    async fn complete_trip(
        &self,
        order_id: &str,
        driver_id: &str,
        distance_km: f64,
        duration: &str,
    ) -> Result<bool, AppError> {
        Ok(self.conditional_update(
            order_id,
            |order| {
                order.status == OrderStatus::OnGoing
                    && order.driver_id.as_deref() == Some(driver_id)
            },
            |order| {
                order.status = OrderStatus::Completed;
                order.distance_actual_km = Some(distance_km);
                order.trip_duration = Some(duration.to_string());
            },
        ))
    }

    async fn supersede_order(
        &self,
        replacement: Order,
        expected_revision: u64,
    ) -> Result<bool, AppError> {
        let order_id = replacement.order_id.clone();
        let passenger_id = replacement.passenger_id.clone();
        Ok(self.conditional_update(
            &order_id,
            |order| {
                order.passenger_id == passenger_id
                    && order.status.is_matchable()
                    && order.revision == expected_revision
            },
            |order| {
                let revision = order.revision;
                *order = replacement;
                order.revision = revision;
            },
        ))
    }
}

struct DriverEntry {
    location: GeoPoint,
    record: AvailabilityRecord,
}

/// Geo index and availability flags for drivers, keyed by driver id.
#[derive(Default)]
pub struct InMemoryDriverRegistry {
    drivers: DashMap<String, DriverEntry>,
}

impl InMemoryDriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}

#[async_trait]
impl GeoIndex for InMemoryDriverRegistry {
    async fn within_radius(
        &self,
        center: GeoPoint,
        radius_km: f64,
    ) -> Result<Vec<GeoHit>, AppError> {
        let mut hits: Vec<GeoHit> = self
            .drivers
            .iter()
            .filter_map(|entry| {
                let distance_km = haversine_km(&center, &entry.location);
                (distance_km <= radius_km).then(|| GeoHit {
                    driver_id: entry.key().clone(),
                    location: entry.location,
                    distance_km,
                })
            })
            .collect();

        hits.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        Ok(hits)
    }
}

#[async_trait]
impl AvailabilityStore for InMemoryDriverRegistry {
    async fn availability(
        &self,
        driver_id: &str,
    ) -> Result<Option<AvailabilityRecord>, AppError> {
        Ok(self.drivers.get(driver_id).map(|entry| entry.record.clone()))
    }

    async fn set_status(&self, driver_id: &str, status: DriverStatus) -> Result<bool, AppError> {
        match self.drivers.get_mut(driver_id) {
            Some(mut entry) => {
                entry.record.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn heartbeat(
        &self,
        driver_id: &str,
        location: GeoPoint,
        seen_at: DateTime<Utc>,
    ) -> Result<AvailabilityRecord, AppError> {
        let mut entry = self
            .drivers
            .entry(driver_id.to_string())
            .or_insert_with(|| DriverEntry {
                location,
                record: AvailabilityRecord {
                    driver_id: driver_id.to_string(),
                    status: DriverStatus::Online,
                    last_seen_at: seen_at,
                },
            });

        entry.location = location;
        entry.record.last_seen_at = seen_at;
        Ok(entry.record.clone())
    }
}

struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// Key/value cache with per-key TTL, read on the tokio clock.
#[derive(Default)]
pub struct InMemoryCache {
    entries: DashMap<String, CacheEntry>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), AppError> {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        }
        Ok(None)
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        let now = Instant::now();
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.key().starts_with(prefix) && entry.expires_at > now)
            .map(|entry| entry.key().clone())
            .collect();

        keys.sort();
        Ok(keys)
    }
}

#[derive(Default)]
pub struct InMemoryWallets {
    balances: DashMap<String, f64>,
}

impl InMemoryWallets {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WalletStore for InMemoryWallets {
    async fn balance(&self, passenger_id: &str) -> Result<Option<f64>, AppError> {
        Ok(self.balances.get(passenger_id).map(|balance| *balance))
    }

    async fn credit(&self, passenger_id: &str, amount: f64) -> Result<f64, AppError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(AppError::Validation("amount must be > 0".to_string()));
        }

        let mut balance = self.balances.entry(passenger_id.to_string()).or_insert(0.0);
        *balance += amount;
        Ok(*balance)
    }
}
