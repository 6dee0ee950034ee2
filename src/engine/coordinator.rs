//! Order lifecycle: quoting, match requests, confirmation, pickup, completion
//! and cancellation.
//!
//! Every transition is checked against the lifecycle graph and then applied
//! with a conditional update at the store. The row is read first, so a missing
//! order (`NotFound`) is reported separately from a lost race (`Conflict`).
//! Side effects after a committed transition are best-effort: they are logged
//! on failure and never change the result.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::engine::matcher::GeoMatcher;
use crate::engine::policy::MatchingPolicy;
use crate::engine::pricing::{format_duration, price_routes};
use crate::engine::route_cache::RoutePlanCache;
use crate::engine::scheduler::{ride_requested_event, BroadcastScheduler};
use crate::error::AppError;
use crate::geo::route::RouteProvider;
use crate::messaging::{EventPublisher, TaskQueue};
use crate::models::driver::{DriverCandidate, DriverStatus};
use crate::models::event::RideEvent;
use crate::models::order::{Order, OrderFilter, OrderStatus, PaymentMethod, TripTracker};
use crate::models::ride_request::RideRequestPayload;
use crate::models::route::{Location, RoutePlan};
use crate::observability::metrics::Metrics;
use crate::store::{AvailabilityStore, Cache, GeoIndex, OrderStore, WalletStore};

pub fn pickup_offer_prefix(order_id: &str) -> String {
    format!("DRIVER:REQUEST-PICKUP:{order_id}:")
}

pub fn pickup_offer_key(order_id: &str, driver_id: &str) -> String {
    format!("{}{driver_id}", pickup_offer_prefix(order_id))
}

pub fn picking_passenger_key(driver_id: &str) -> String {
    format!("DRIVER:PICKING-PASSENGER:{driver_id}")
}

pub fn trip_tracker_key(order_id: &str) -> String {
    format!("trip:{order_id}")
}

/// External collaborators, injected once at startup.
pub struct Collaborators {
    pub orders: Arc<dyn OrderStore>,
    pub geo: Arc<dyn GeoIndex>,
    pub availability: Arc<dyn AvailabilityStore>,
    pub cache: Arc<dyn Cache>,
    pub wallets: Arc<dyn WalletStore>,
    pub routes: Arc<dyn RouteProvider>,
    pub publisher: Arc<dyn EventPublisher>,
    pub queue: Arc<dyn TaskQueue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResponse {
    pub order_id: String,
    pub candidate_count: usize,
    pub message: String,
    pub drivers: Vec<DriverCandidate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmResponse {
    pub order_id: String,
    pub passenger_id: String,
    pub driver_id: String,
    pub status: OrderStatus,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionReceipt {
    pub order_id: String,
    pub driver_id: String,
    pub status: OrderStatus,
    pub distance_actual_km: f64,
    pub duration: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelResponse {
    pub order_id: String,
    pub status: OrderStatus,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupOffer {
    pub driver_id: String,
    pub offered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupOffers {
    pub order: Order,
    pub offers: Vec<PickupOffer>,
}

pub struct OrderCoordinator {
    orders: Arc<dyn OrderStore>,
    availability: Arc<dyn AvailabilityStore>,
    cache: Arc<dyn Cache>,
    wallets: Arc<dyn WalletStore>,
    routes: Arc<dyn RouteProvider>,
    publisher: Arc<dyn EventPublisher>,
    matcher: GeoMatcher,
    route_plans: RoutePlanCache,
    scheduler: Arc<BroadcastScheduler>,
    policy: MatchingPolicy,
    metrics: Metrics,
}

impl OrderCoordinator {
    pub fn new(collaborators: Collaborators, policy: MatchingPolicy, metrics: Metrics) -> Self {
        let Collaborators {
            orders,
            geo,
            availability,
            cache,
            wallets,
            routes,
            publisher,
            queue,
        } = collaborators;

        let matcher = GeoMatcher::new(
            geo,
            availability.clone(),
            policy.search_radius_km,
            policy.driver_freshness,
        );
        let route_plans = RoutePlanCache::new(cache.clone(), policy.route_plan_ttl);
        let scheduler = Arc::new(BroadcastScheduler::new(
            orders.clone(),
            publisher.clone(),
            queue,
            policy.clone(),
            metrics.clone(),
        ));

        Self {
            orders,
            availability,
            cache,
            wallets,
            routes,
            publisher,
            matcher,
            route_plans,
            scheduler,
            policy,
            metrics,
        }
    }

    pub fn scheduler(&self) -> Arc<BroadcastScheduler> {
        self.scheduler.clone()
    }

    pub fn route_plans(&self) -> &RoutePlanCache {
        &self.route_plans
    }

    /// Prices the routes between two points and stores the quote for the
    /// passenger, replacing any earlier one.
    pub async fn plan_trip(
        &self,
        passenger_id: &str,
        origin: Location,
        destination: Location,
    ) -> Result<RoutePlan, AppError> {
        require_id("passenger_id", passenger_id)?;
        for (field, location) in [("origin", &origin), ("destination", &destination)] {
            if !location.point().is_valid() {
                return Err(AppError::Validation(format!(
                    "{field} coordinates are out of range"
                )));
            }
        }

        let candidates = self
            .routes
            .routes(&origin, &destination)
            .await
            .map_err(logged("route_provider.routes"))?;
        let plan = price_routes(origin, destination, &candidates, self.policy.price_per_km)?;

        self.route_plans
            .put(passenger_id, &plan)
            .await
            .map_err(logged("route_plans.put"))?;

        info!(
            passenger_id,
            min_price = plan.min_price,
            max_price = plan.max_price,
            "route plan quoted"
        );
        Ok(plan)
    }

    pub async fn request_match(
        &self,
        passenger_id: &str,
        payment_method: &str,
    ) -> Result<MatchResponse, AppError> {
        let start = Instant::now();
        let result = self.try_request_match(passenger_id, payment_method).await;

        let outcome = match &result {
            Ok(_) => "created",
            Err(err) => err.category(),
        };
        self.metrics
            .ride_orders_total
            .with_label_values(&[outcome])
            .inc();
        self.metrics
            .match_latency_seconds
            .with_label_values(&[outcome])
            .observe(start.elapsed().as_secs_f64());

        result
    }

    async fn try_request_match(
        &self,
        passenger_id: &str,
        payment_method: &str,
    ) -> Result<MatchResponse, AppError> {
        require_id("passenger_id", passenger_id)?;
        let method: PaymentMethod = payment_method.parse()?;
        let plan = self.route_plans.get(passenger_id).await?;

        self.check_payment(passenger_id, method, &plan).await?;

        let drivers = self
            .matcher
            .find_candidates(plan.origin.point())
            .await
            .map_err(logged("geo_matcher.find_candidates"))?;

        let order_id = self.claim_order(passenger_id, method, &plan).await?;

        let payload = RideRequestPayload {
            order_temp_id: order_id.clone(),
            passenger_id: passenger_id.to_string(),
            route_plan: plan,
            attempt: 1,
        };

        self.publisher
            .publish(&ride_requested_event(&payload))
            .await
            .map_err(logged("publisher.publish"))?;

        if let Err(err) = self.scheduler.schedule_first(&payload).await {
            error!(order_id = %order_id, error = %err, "failed to enqueue broadcast task");
        }

        let candidate_count = drivers.len();
        let message = match candidate_count {
            0 => "No driver available right now, we will keep looking for you".to_string(),
            1 => "Please sit back, there is 1 driver available, we will let you know".to_string(),
            n => format!("Please sit back, there are {n} drivers available, we will let you know"),
        };

        info!(order_id = %order_id, passenger_id, candidate_count, "ride requested");
        Ok(MatchResponse {
            order_id,
            candidate_count,
            message,
            drivers,
        })
    }

    async fn check_payment(
        &self,
        passenger_id: &str,
        method: PaymentMethod,
        plan: &RoutePlan,
    ) -> Result<(), AppError> {
        match method {
            PaymentMethod::Wallet => {
                let balance = self
                    .wallets
                    .balance(passenger_id)
                    .await
                    .map_err(logged("wallets.balance"))?
                    .ok_or_else(|| {
                        AppError::NotFound("wallet not found, please create a wallet first".to_string())
                    })?;

                if balance < plan.max_price {
                    return Err(AppError::Validation(
                        "insufficient balance, please top up".to_string(),
                    ));
                }
            }
            PaymentMethod::Cash | PaymentMethod::Qris => {
                if plan.max_price < self.policy.min_direct_payment {
                    return Err(AppError::Validation(format!(
                        "minimum payment amount is {}",
                        self.policy.min_direct_payment
                    )));
                }
                if plan.max_price > self.policy.max_direct_payment {
                    return Err(AppError::Validation(format!(
                        "maximum payment amount exceeded ({})",
                        self.policy.max_direct_payment
                    )));
                }
            }
        }

        Ok(())
    }

    /// One active order per passenger: creates a new order, or rewrites a
    /// stale unmatched one in place.
    async fn claim_order(
        &self,
        passenger_id: &str,
        method: PaymentMethod,
        plan: &RoutePlan,
    ) -> Result<String, AppError> {
        let active = self
            .orders
            .find_orders(
                &OrderFilter::default()
                    .passenger(passenger_id)
                    .status_in(&OrderStatus::ACTIVE),
            )
            .await
            .map_err(logged("orders.find_orders"))?;

        let Some(current) = active.into_iter().next() else {
            let order_id = format!("ride-{}", Uuid::new_v4().simple());
            let order = Order::new(
                order_id.clone(),
                passenger_id.to_string(),
                plan.clone(),
                method,
            );
            // A concurrent request for the same passenger may have inserted first.
            self.orders
                .create_order(order)
                .await
                .map_err(|err| match err {
                    AppError::Conflict(_) => AppError::Conflict(
                        "There are still orders being processed, please wait for the driver or cancel the previous order".to_string(),
                    ),
                    other => logged("orders.create_order")(other),
                })?;
            return Ok(order_id);
        };

        match current.status {
            OrderStatus::Requested | OrderStatus::Matching => {
                if elapsed_since(current.created_at) <= self.policy.matching_timeout {
                    return Err(AppError::Conflict(
                        "There are still orders being processed, please wait for the driver or cancel the previous order".to_string(),
                    ));
                }

                let replacement = Order::new(
                    current.order_id.clone(),
                    passenger_id.to_string(),
                    plan.clone(),
                    method,
                );
                let applied = self
                    .orders
                    .supersede_order(replacement, current.revision)
                    .await
                    .map_err(logged("orders.supersede_order"))?;
                self.metrics.transition("supersede", applied);

                if !applied {
                    return Err(AppError::Conflict(
                        "Previous order changed while it was being replaced, please retry".to_string(),
                    ));
                }

                info!(order_id = %current.order_id, "stale order superseded");
                Ok(current.order_id)
            }
            OrderStatus::Accepted => Err(AppError::Conflict(
                "Your order has been accepted by a driver. Complete or cancel it before creating a new one".to_string(),
            )),
            OrderStatus::OnGoing => Err(AppError::Conflict(
                "Your trip is in progress. Please complete your trip before placing a new order".to_string(),
            )),
            OrderStatus::Completed | OrderStatus::Cancelled => Err(AppError::Internal(format!(
                "terminal order {} returned as active",
                current.order_id
            ))),
        }
    }

    /// A driver signals interest in a broadcast ride.
    pub async fn offer_pickup(
        &self,
        order_id: &str,
        driver_id: &str,
    ) -> Result<PickupOffer, AppError> {
        require_id("order_id", order_id)?;
        require_id("driver_id", driver_id)?;

        let order = self.load_order(&OrderFilter::by_id(order_id)).await?;
        if !order.status.is_matchable() {
            return Err(AppError::Conflict(format!(
                "Order is no longer open for pickup offers (status {})",
                order.status
            )));
        }

        let offer = PickupOffer {
            driver_id: driver_id.to_string(),
            offered_at: Utc::now(),
        };
        self.cache
            .set(
                &pickup_offer_key(order_id, driver_id),
                serde_json::to_string(&offer)?,
                self.policy.pickup_offer_ttl,
            )
            .await
            .map_err(logged("cache.set"))?;

        info!(order_id, driver_id, "pickup offered");
        Ok(offer)
    }

    /// Lists drivers that offered to take the ride and moves the order into
    /// `MATCHING`.
    pub async fn pickup_offers(&self, order_id: &str) -> Result<PickupOffers, AppError> {
        require_id("order_id", order_id)?;

        let mut order = self.load_order(&OrderFilter::by_id(order_id)).await?;
        if !order.status.is_matchable() {
            return Err(AppError::Conflict(format!(
                "Order is no longer matching (status {})",
                order.status
            )));
        }

        let keys = self
            .cache
            .keys_with_prefix(&pickup_offer_prefix(order_id))
            .await
            .map_err(logged("cache.keys_with_prefix"))?;

        let mut offers = Vec::with_capacity(keys.len());
        for key in keys {
            let Some(raw) = self.cache.get(&key).await.map_err(logged("cache.get"))? else {
                continue;
            };
            match serde_json::from_str::<PickupOffer>(&raw) {
                Ok(offer) => offers.push(offer),
                Err(err) => warn!(key = %key, error = %err, "skipping unreadable pickup offer"),
            }
        }

        if offers.is_empty() {
            return Err(AppError::NotFound(
                "No driver pickup request found for this order yet, we are still looking".to_string(),
            ));
        }

        if order.status == OrderStatus::Requested {
            self.transition(&order, OrderStatus::Matching, "matching").await?;
            order.status = OrderStatus::Matching;
        }

        Ok(PickupOffers { order, offers })
    }

    pub async fn confirm(
        &self,
        order_id: &str,
        passenger_id: &str,
        driver_id: &str,
    ) -> Result<ConfirmResponse, AppError> {
        require_id("order_id", order_id)?;
        require_id("passenger_id", passenger_id)?;
        require_id("driver_id", driver_id)?;

        let order = self
            .load_order(&OrderFilter::by_id(order_id).passenger(passenger_id))
            .await?;

        match order.status {
            OrderStatus::Completed | OrderStatus::Cancelled => {
                return Err(AppError::Conflict(
                    "Order is already completed or cancelled".to_string(),
                ));
            }
            OrderStatus::Accepted | OrderStatus::OnGoing => {
                return Err(AppError::Conflict(
                    "Order already has a driver assigned".to_string(),
                ));
            }
            OrderStatus::Requested | OrderStatus::Matching => {}
        }
        ensure_transition(&order, OrderStatus::Accepted)?;

        let applied = self
            .orders
            .assign_driver(order_id, passenger_id, driver_id)
            .await
            .map_err(logged("orders.assign_driver"))?;
        self.metrics.transition("accept", applied);

        if !applied {
            warn!(order_id, driver_id, "confirm lost the race");
            return Err(AppError::Conflict(
                "Order has already been taken or is no longer in a confirmable state".to_string(),
            ));
        }

        self.publish_after_commit(RideEvent::DriverMatched {
            event_id: RideEvent::new_event_id("driver_match"),
            order_id: order_id.to_string(),
            passenger_id: passenger_id.to_string(),
            driver_id: driver_id.to_string(),
            route_plan: order.route_plan,
            emitted_at: Utc::now(),
        })
        .await;

        info!(order_id, driver_id, "driver confirmed");
        Ok(ConfirmResponse {
            order_id: order_id.to_string(),
            passenger_id: passenger_id.to_string(),
            driver_id: driver_id.to_string(),
            status: OrderStatus::Accepted,
            message: "Order confirmed. Driver has been assigned.".to_string(),
        })
    }

    pub async fn pick_up(&self, order_id: &str, driver_id: &str) -> Result<Order, AppError> {
        require_id("order_id", order_id)?;
        require_id("driver_id", driver_id)?;

        let mut order = self.load_order(&OrderFilter::by_id(order_id)).await?;

        let rejection = match order.status {
            OrderStatus::Completed | OrderStatus::Cancelled => {
                Some("Order is no longer available (already completed or cancelled)")
            }
            OrderStatus::OnGoing => Some("Trip is already in progress"),
            OrderStatus::Requested | OrderStatus::Matching => {
                Some("Passenger has not confirmed a driver yet for this order")
            }
            OrderStatus::Accepted => match order.driver_id.as_deref() {
                None | Some("") => Some("No driver assigned to this order yet"),
                Some(assigned) if assigned != driver_id => {
                    Some("You are not the assigned driver for this order")
                }
                Some(_) => None,
            },
        };
        if let Some(reason) = rejection {
            return Err(AppError::Conflict(reason.to_string()));
        }
        ensure_transition(&order, OrderStatus::OnGoing)?;

        let applied = self
            .orders
            .update_status_for_driver(
                order_id,
                driver_id,
                OrderStatus::Accepted,
                OrderStatus::OnGoing,
            )
            .await
            .map_err(logged("orders.update_status_for_driver"))?;
        self.metrics.transition("pick_up", applied);

        if !applied {
            return Err(AppError::Conflict(
                "Order could not be moved to ON_GOING, it may have been changed or cancelled"
                    .to_string(),
            ));
        }

        order.status = OrderStatus::OnGoing;
        order.updated_at = Utc::now();

        self.set_driver_status(driver_id, DriverStatus::OnTrip).await;

        match serde_json::to_string(&order) {
            Ok(body) => {
                if let Err(err) = self
                    .cache
                    .set(
                        &picking_passenger_key(driver_id),
                        body,
                        self.policy.picking_passenger_ttl,
                    )
                    .await
                {
                    warn!(order_id, driver_id, error = %err, "failed to cache picking record");
                }
            }
            Err(err) => warn!(order_id, error = %err, "failed to encode picking record"),
        }

        self.publish_after_commit(RideEvent::PassengerPickedUp {
            event_id: RideEvent::new_event_id("pickup"),
            order_id: order_id.to_string(),
            passenger_id: order.passenger_id.clone(),
            driver_id: driver_id.to_string(),
            emitted_at: Utc::now(),
        })
        .await;

        info!(order_id, driver_id, "passenger picked up");
        Ok(order)
    }

    pub async fn complete(
        &self,
        order_id: &str,
        driver_id: &str,
        measured_distance_km: f64,
    ) -> Result<CompletionReceipt, AppError> {
        require_id("order_id", order_id)?;
        require_id("driver_id", driver_id)?;
        if !measured_distance_km.is_finite() || measured_distance_km < 0.0 {
            return Err(AppError::Validation(
                "distance must be a non-negative number".to_string(),
            ));
        }

        let order = self
            .load_order(&OrderFilter::by_id(order_id).driver(driver_id))
            .await?;
        if order.status != OrderStatus::OnGoing {
            return Err(AppError::Conflict(format!(
                "Cannot complete trip in status {}",
                order.status
            )));
        }

        let tracker_key = trip_tracker_key(order_id);
        let raw = self
            .cache
            .get(&tracker_key)
            .await
            .map_err(logged("cache.get"))?
            .filter(|raw| !raw.is_empty())
            .ok_or_else(|| {
                AppError::NotFound(format!("trip tracking data for order {order_id} not found"))
            })?;
        let tracker: TripTracker = serde_json::from_str(&raw)
            .map_err(|err| AppError::Internal(format!("corrupt trip tracker: {err}")))?;

        if !tracker.driver_id.is_empty() && tracker.driver_id != driver_id {
            return Err(AppError::Conflict(
                "Trip data does not belong to this driver".to_string(),
            ));
        }
        ensure_transition(&order, OrderStatus::Completed)?;

        let duration = format_duration((elapsed_since(order.created_at).as_secs() / 60) as u32);
        let applied = self
            .orders
            .complete_trip(order_id, driver_id, measured_distance_km, &duration)
            .await
            .map_err(logged("orders.complete_trip"))?;
        self.metrics.transition("complete", applied);

        if !applied {
            return Err(AppError::Conflict(
                "Order could not be completed, it may have been updated or cancelled".to_string(),
            ));
        }

        self.set_driver_status(driver_id, DriverStatus::Online).await;
        for key in [
            picking_passenger_key(driver_id),
            tracker_key,
            format!("order:{order_id}:distance"),
            format!("order:{order_id}:driver:{driver_id}"),
        ] {
            if let Err(err) = self.cache.delete(&key).await {
                warn!(key = %key, error = %err, "failed to clear trip key");
            }
        }

        self.publish_after_commit(RideEvent::TripCompleted {
            event_id: RideEvent::new_event_id("trip_complete"),
            order_id: order_id.to_string(),
            driver_id: driver_id.to_string(),
            distance_km: measured_distance_km,
            duration: duration.clone(),
            emitted_at: Utc::now(),
        })
        .await;

        info!(order_id, driver_id, distance_km = measured_distance_km, "trip completed");
        Ok(CompletionReceipt {
            order_id: order_id.to_string(),
            driver_id: driver_id.to_string(),
            status: OrderStatus::Completed,
            distance_actual_km: measured_distance_km,
            duration,
            message: "Trip completed successfully".to_string(),
        })
    }

    pub async fn cancel(
        &self,
        order_id: &str,
        passenger_id: &str,
    ) -> Result<CancelResponse, AppError> {
        require_id("order_id", order_id)?;
        require_id("passenger_id", passenger_id)?;

        let order = self
            .load_order(&OrderFilter::by_id(order_id).passenger(passenger_id))
            .await?;
        if !order.status.is_cancellable() {
            return Err(AppError::Conflict(format!(
                "Cannot cancel order in status {}",
                order.status
            )));
        }

        self.transition(&order, OrderStatus::Cancelled, "cancel").await?;

        if let Err(err) = self.route_plans.remove(passenger_id).await {
            warn!(order_id, error = %err, "failed to drop route plan");
        }
        self.publish_after_commit(RideEvent::OrderCancelled {
            event_id: RideEvent::new_event_id("cancel"),
            order_id: order_id.to_string(),
            passenger_id: passenger_id.to_string(),
            emitted_at: Utc::now(),
        })
        .await;

        info!(order_id, passenger_id, previous = %order.status, "order cancelled");
        Ok(CancelResponse {
            order_id: order_id.to_string(),
            status: OrderStatus::Cancelled,
            message: "Order cancelled successfully".to_string(),
        })
    }

    pub async fn order_detail(&self, order_id: &str) -> Result<Order, AppError> {
        require_id("order_id", order_id)?;
        self.load_order(&OrderFilter::by_id(order_id)).await
    }

    async fn load_order(&self, filter: &OrderFilter) -> Result<Order, AppError> {
        self.orders
            .find_one_order(filter)
            .await
            .map_err(logged("orders.find_one_order"))?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
    }

    /// Conditional status change from the order's observed status.
    async fn transition(
        &self,
        order: &Order,
        next: OrderStatus,
        label: &str,
    ) -> Result<(), AppError> {
        ensure_transition(order, next)?;

        let applied = self
            .orders
            .update_status(&order.order_id, order.status, next)
            .await
            .map_err(logged("orders.update_status"))?;
        self.metrics.transition(label, applied);

        if !applied {
            warn!(order_id = %order.order_id, from = %order.status, to = %next, "transition lost the race");
            return Err(AppError::Conflict(format!(
                "Order {} changed concurrently, could not move it to {next}",
                order.order_id
            )));
        }
        Ok(())
    }

    async fn set_driver_status(&self, driver_id: &str, status: DriverStatus) {
        match self.availability.set_status(driver_id, status).await {
            Ok(true) => {}
            Ok(false) => warn!(driver_id, ?status, "driver has no availability record"),
            Err(err) => warn!(driver_id, ?status, error = %err, "failed to update driver availability"),
        }
    }

    async fn publish_after_commit(&self, event: RideEvent) {
        if let Err(err) = self.publisher.publish(&event).await {
            warn!(
                order_id = event.order_id(),
                kind = event.kind(),
                error = %err,
                "failed to publish event after commit"
            );
        }
    }
}

fn require_id(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}

fn ensure_transition(order: &Order, next: OrderStatus) -> Result<(), AppError> {
    if !order.status.can_transition_to(next) {
        return Err(AppError::Conflict(format!(
            "Order {} cannot move from {} to {next}",
            order.order_id, order.status
        )));
    }
    Ok(())
}

fn elapsed_since(at: DateTime<Utc>) -> Duration {
    (Utc::now() - at).to_std().unwrap_or_default()
}

fn logged(operation: &'static str) -> impl Fn(AppError) -> AppError {
    move |err| {
        if matches!(err, AppError::Internal(_)) {
            error!(operation, error = %err, "collaborator call failed");
        }
        err
    }
}
