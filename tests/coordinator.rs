use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use ride_coordinator::engine::coordinator::{
    pickup_offer_prefix, trip_tracker_key, Collaborators, OrderCoordinator,
};
use ride_coordinator::engine::policy::MatchingPolicy;
use ride_coordinator::engine::worker::run_broadcast_worker;
use ride_coordinator::error::AppError;
use ride_coordinator::geo::route::StraightLineRouteProvider;
use ride_coordinator::messaging::{EventPublisher, TaskQueue};
use ride_coordinator::models::driver::GeoPoint;
use ride_coordinator::models::event::RideEvent;
use ride_coordinator::models::order::{
    Order, OrderFilter, OrderStatus, PaymentMethod, TripTracker,
};
use ride_coordinator::models::ride_request::{RideRequestPayload, Task, TASK_BROADCAST_RIDE};
use ride_coordinator::models::route::{Location, RoutePlan};
use ride_coordinator::observability::metrics::Metrics;
use ride_coordinator::state::AppState;
use ride_coordinator::store::memory::{
    InMemoryCache, InMemoryDriverRegistry, InMemoryOrderStore, InMemoryWallets,
};
use ride_coordinator::store::{AvailabilityStore, Cache, OrderStore};

#[derive(Default)]
struct RecordingPublisher {
    events: Mutex<Vec<RideEvent>>,
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: &RideEvent) -> Result<(), AppError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

#[derive(Default)]
struct RecordingQueue {
    tasks: Mutex<Vec<(Task, Duration)>>,
}

#[async_trait]
impl TaskQueue for RecordingQueue {
    async fn enqueue(&self, task: Task, delay: Duration) -> Result<(), AppError> {
        self.tasks.lock().unwrap().push((task, delay));
        Ok(())
    }
}

/// Hands control back to the scheduler before every write, the way a
/// networked store would between read and write.
struct YieldingOrderStore {
    inner: Arc<InMemoryOrderStore>,
}

#[async_trait]
impl OrderStore for YieldingOrderStore {
    async fn create_order(&self, order: Order) -> Result<(), AppError> {
        tokio::task::yield_now().await;
        self.inner.create_order(order).await
    }

    async fn find_one_order(&self, filter: &OrderFilter) -> Result<Option<Order>, AppError> {
        self.inner.find_one_order(filter).await
    }

    async fn find_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, AppError> {
        let orders = self.inner.find_orders(filter).await;
        tokio::task::yield_now().await;
        orders
    }

    async fn update_status(
        &self,
        order_id: &str,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<bool, AppError> {
        tokio::task::yield_now().await;
        self.inner.update_status(order_id, expected, next).await
    }

    async fn update_status_for_driver(
        &self,
        order_id: &str,
        driver_id: &str,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<bool, AppError> {
        tokio::task::yield_now().await;
        self.inner
            .update_status_for_driver(order_id, driver_id, expected, next)
            .await
    }

    async fn assign_driver(
        &self,
        order_id: &str,
        passenger_id: &str,
        driver_id: &str,
    ) -> Result<bool, AppError> {
        tokio::task::yield_now().await;
        self.inner.assign_driver(order_id, passenger_id, driver_id).await
    }

    async fn complete_trip(
        &self,
        order_id: &str,
        driver_id: &str,
        distance_km: f64,
        duration: &str,
    ) -> Result<bool, AppError> {
        tokio::task::yield_now().await;
        self.inner
            .complete_trip(order_id, driver_id, distance_km, duration)
            .await
    }

    async fn supersede_order(
        &self,
        replacement: Order,
        expected_revision: u64,
    ) -> Result<bool, AppError> {
        tokio::task::yield_now().await;
        self.inner.supersede_order(replacement, expected_revision).await
    }
}

struct Fixture {
    coordinator: Arc<OrderCoordinator>,
    orders: Arc<InMemoryOrderStore>,
    drivers: Arc<InMemoryDriverRegistry>,
    cache: Arc<InMemoryCache>,
    publisher: Arc<RecordingPublisher>,
    queue: Arc<RecordingQueue>,
}

fn fixture() -> Fixture {
    let orders = Arc::new(InMemoryOrderStore::new());
    build(orders.clone(), orders)
}

fn yielding_fixture() -> Fixture {
    let orders = Arc::new(InMemoryOrderStore::new());
    let store = Arc::new(YieldingOrderStore {
        inner: orders.clone(),
    });
    build(orders, store)
}

fn build(orders: Arc<InMemoryOrderStore>, store: Arc<dyn OrderStore>) -> Fixture {
    let drivers = Arc::new(InMemoryDriverRegistry::new());
    let cache = Arc::new(InMemoryCache::new());
    let publisher = Arc::new(RecordingPublisher::default());
    let queue = Arc::new(RecordingQueue::default());

    let coordinator = OrderCoordinator::new(
        Collaborators {
            orders: store,
            geo: drivers.clone(),
            availability: drivers.clone(),
            cache: cache.clone(),
            wallets: Arc::new(InMemoryWallets::new()),
            routes: Arc::new(StraightLineRouteProvider),
            publisher: publisher.clone(),
            queue: queue.clone(),
        },
        MatchingPolicy::default(),
        Metrics::new(),
    );

    Fixture {
        coordinator: Arc::new(coordinator),
        orders,
        drivers,
        cache,
        publisher,
        queue,
    }
}

fn plan() -> RoutePlan {
    RoutePlan {
        origin: Location {
            lat: -6.2,
            lng: 106.8,
            address: "Sudirman".to_string(),
        },
        destination: Location {
            lat: -6.25,
            lng: 106.85,
            address: "Kuningan".to_string(),
        },
        min_price: 15_000.0,
        max_price: 22_000.0,
        best_route_km: 5.0,
        best_route_price: 15_000.0,
        best_route_duration: "12m".to_string(),
        duration_minutes: 12,
    }
}

async fn online(drivers: &InMemoryDriverRegistry, driver_id: &str, lat: f64, lng: f64) {
    drivers
        .heartbeat(driver_id, GeoPoint { lat, lng }, Utc::now())
        .await
        .unwrap();
}

async fn stored(orders: &InMemoryOrderStore, order_id: &str) -> Order {
    orders
        .find_one_order(&OrderFilter::by_id(order_id))
        .await
        .unwrap()
        .unwrap()
}

/// Inserts an order directly in `status`, bypassing the lifecycle. Each seeded
/// order gets its own passenger so several can be active at once.
async fn seed(
    orders: &InMemoryOrderStore,
    order_id: &str,
    status: OrderStatus,
    driver_id: Option<&str>,
) -> Order {
    let mut order = Order::new(
        order_id.to_string(),
        format!("passenger-{order_id}"),
        plan(),
        PaymentMethod::Cash,
    );
    order.status = status;
    order.driver_id = driver_id.map(str::to_string);
    orders.create_order(order.clone()).await.unwrap();
    order
}

fn assert_untouched(before: &Order, after: &Order) {
    assert_eq!(after.status, before.status);
    assert_eq!(after.driver_id, before.driver_id);
    assert_eq!(after.updated_at, before.updated_at);
    assert_eq!(after.revision, before.revision);
}

#[tokio::test]
async fn match_request_creates_order_and_first_broadcast() {
    let fx = fixture();
    online(&fx.drivers, "d-1", -6.201, 106.801).await;
    online(&fx.drivers, "d-2", -6.205, 106.805).await;
    fx.coordinator.route_plans().put("p-1", &plan()).await.unwrap();

    let response = fx.coordinator.request_match("p-1", "cash").await.unwrap();

    assert_eq!(response.candidate_count, 2);
    assert_eq!(
        response.message,
        "Please sit back, there are 2 drivers available, we will let you know"
    );
    assert_eq!(response.drivers[0].driver_id, "d-1");

    let order = stored(&fx.orders, &response.order_id).await;
    assert_eq!(order.status, OrderStatus::Requested);
    assert_eq!(order.payment_method, PaymentMethod::Cash);
    assert_eq!(order.route_plan, plan());

    let events = fx.publisher.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind(), "ride_requested");

    let tasks = fx.queue.tasks.lock().unwrap();
    assert_eq!(tasks.len(), 1);
    let (task, delay) = &tasks[0];
    assert_eq!(task.kind, TASK_BROADCAST_RIDE);
    assert_eq!(task.max_retry, 5);
    assert_eq!(*delay, Duration::from_secs(60));

    let payload: RideRequestPayload = serde_json::from_slice(&task.payload).unwrap();
    assert_eq!(payload.attempt, 1);
    assert_eq!(payload.order_temp_id, response.order_id);
}

#[tokio::test]
async fn stale_unmatched_order_is_superseded_in_place() {
    let fx = fixture();
    let mut stale = Order::new(
        "ride-stale".to_string(),
        "p-1".to_string(),
        plan(),
        PaymentMethod::Qris,
    );
    stale.created_at = Utc::now() - chrono::Duration::minutes(20);
    fx.orders.create_order(stale).await.unwrap();

    let mut fresh_plan = plan();
    fresh_plan.max_price = 25_000.0;
    fx.coordinator.route_plans().put("p-1", &fresh_plan).await.unwrap();

    let response = fx.coordinator.request_match("p-1", "cash").await.unwrap();

    assert_eq!(response.order_id, "ride-stale");
    assert_eq!(fx.orders.len(), 1);

    let order = stored(&fx.orders, "ride-stale").await;
    assert_eq!(order.status, OrderStatus::Requested);
    assert_eq!(order.payment_method, PaymentMethod::Cash);
    assert_eq!(order.route_plan.max_price, 25_000.0);
    assert!(Utc::now() - order.created_at < chrono::Duration::minutes(1));
}

#[tokio::test]
async fn fresh_unmatched_order_blocks_a_new_request() {
    let fx = fixture();
    fx.coordinator.route_plans().put("p-1", &plan()).await.unwrap();
    fx.coordinator.request_match("p-1", "cash").await.unwrap();

    let err = fx.coordinator.request_match("p-1", "cash").await.unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(fx.orders.len(), 1);
    assert_eq!(fx.queue.tasks.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn accepted_order_blocks_a_new_request() {
    let fx = fixture();
    fx.coordinator.route_plans().put("p-1", &plan()).await.unwrap();
    let response = fx.coordinator.request_match("p-1", "cash").await.unwrap();
    fx.coordinator
        .confirm(&response.order_id, "p-1", "d-1")
        .await
        .unwrap();

    let err = fx.coordinator.request_match("p-1", "cash").await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_confirms_apply_exactly_once() {
    let fx = fixture();
    fx.coordinator.route_plans().put("p-1", &plan()).await.unwrap();
    let order_id = fx
        .coordinator
        .request_match("p-1", "cash")
        .await
        .unwrap()
        .order_id;

    let first = {
        let coordinator = fx.coordinator.clone();
        let order_id = order_id.clone();
        tokio::spawn(async move { coordinator.confirm(&order_id, "p-1", "d-1").await })
    };
    let second = {
        let coordinator = fx.coordinator.clone();
        let order_id = order_id.clone();
        tokio::spawn(async move { coordinator.confirm(&order_id, "p-1", "d-2").await })
    };
    let (first, second) = tokio::join!(first, second);
    let results = [first.unwrap(), second.unwrap()];

    let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(AppError::Conflict(_)))));

    let order = stored(&fx.orders, &order_id).await;
    assert_eq!(order.status, OrderStatus::Accepted);
    assert_eq!(order.driver_id.as_deref(), Some(winners[0].driver_id.as_str()));

    let matched = fx
        .publisher
        .events
        .lock()
        .unwrap()
        .iter()
        .filter(|event| event.kind() == "driver_matched")
        .count();
    assert_eq!(matched, 1);
}

#[tokio::test]
async fn confirm_by_another_passenger_is_not_found() {
    let fx = fixture();
    fx.coordinator.route_plans().put("p-1", &plan()).await.unwrap();
    let order_id = fx
        .coordinator
        .request_match("p-1", "cash")
        .await
        .unwrap()
        .order_id;

    let err = fx
        .coordinator
        .confirm(&order_id, "p-2", "d-1")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(stored(&fx.orders, &order_id).await.status, OrderStatus::Requested);
}

#[tokio::test]
async fn cancel_of_completed_order_leaves_it_untouched() {
    let fx = fixture();
    let mut order = Order::new(
        "ride-done".to_string(),
        "p-1".to_string(),
        plan(),
        PaymentMethod::Cash,
    );
    order.status = OrderStatus::Completed;
    order.driver_id = Some("d-1".to_string());
    fx.orders.create_order(order.clone()).await.unwrap();

    let err = fx.coordinator.cancel("ride-done", "p-1").await.unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
    let after = stored(&fx.orders, "ride-done").await;
    assert_eq!(after.status, OrderStatus::Completed);
    assert_eq!(after.updated_at, order.updated_at);
    assert!(fx.publisher.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn cancelled_order_accepts_no_further_transitions() {
    let fx = fixture();
    fx.coordinator.route_plans().put("p-1", &plan()).await.unwrap();
    let order_id = fx
        .coordinator
        .request_match("p-1", "cash")
        .await
        .unwrap()
        .order_id;
    fx.coordinator.cancel(&order_id, "p-1").await.unwrap();

    let confirm = fx.coordinator.confirm(&order_id, "p-1", "d-1").await;
    let pick_up = fx.coordinator.pick_up(&order_id, "d-1").await;
    let offer = fx.coordinator.offer_pickup(&order_id, "d-1").await;

    assert!(matches!(confirm, Err(AppError::Conflict(_))));
    assert!(matches!(pick_up, Err(AppError::Conflict(_))));
    assert!(matches!(offer, Err(AppError::Conflict(_))));
    assert_eq!(stored(&fx.orders, &order_id).await.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn pick_up_by_unassigned_driver_is_rejected() {
    let fx = fixture();
    fx.coordinator.route_plans().put("p-1", &plan()).await.unwrap();
    let order_id = fx
        .coordinator
        .request_match("p-1", "cash")
        .await
        .unwrap()
        .order_id;
    fx.coordinator.confirm(&order_id, "p-1", "d-1").await.unwrap();

    let err = fx.coordinator.pick_up(&order_id, "d-2").await.unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(stored(&fx.orders, &order_id).await.status, OrderStatus::Accepted);
}

#[tokio::test]
async fn complete_rejects_negative_distance() {
    let fx = fixture();
    let err = fx
        .coordinator
        .complete("ride-1", "d-1", -1.0)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test(start_paused = true)]
async fn unmatched_ride_is_broadcast_until_the_attempt_ceiling() {
    let (state, task_rx) = AppState::new(MatchingPolicy::default(), 64, 64);
    let state = Arc::new(state);
    let mut events = state.events.subscribe();

    tokio::spawn(run_broadcast_worker(
        state.coordinator.scheduler(),
        state.queue.clone(),
        Duration::from_secs(10),
        task_rx,
    ));

    state.coordinator.route_plans().put("p-1", &plan()).await.unwrap();
    let order_id = state
        .coordinator
        .request_match("p-1", "cash")
        .await
        .unwrap()
        .order_id;

    let mut attempts = Vec::new();
    while let Ok(Ok(event)) =
        tokio::time::timeout(Duration::from_secs(600), events.recv()).await
    {
        if let RideEvent::RideRequested { attempt, .. } = event {
            attempts.push(attempt);
        }
    }

    assert_eq!(attempts, vec![1, 1, 2, 3, 4]);

    // exhausted broadcasts leave the order waiting
    let order = stored(&state.orders, &order_id).await;
    assert_eq!(order.status, OrderStatus::Requested);
    assert_eq!(state.metrics.broadcast_tasks_pending.get(), 0);
}

#[tokio::test(start_paused = true)]
async fn broadcasts_stop_once_a_driver_is_confirmed() {
    let (state, task_rx) = AppState::new(MatchingPolicy::default(), 64, 64);
    let state = Arc::new(state);
    let mut events = state.events.subscribe();

    tokio::spawn(run_broadcast_worker(
        state.coordinator.scheduler(),
        state.queue.clone(),
        Duration::from_secs(10),
        task_rx,
    ));

    state.coordinator.route_plans().put("p-1", &plan()).await.unwrap();
    let order_id = state
        .coordinator
        .request_match("p-1", "cash")
        .await
        .unwrap()
        .order_id;
    state
        .coordinator
        .confirm(&order_id, "p-1", "d-1")
        .await
        .unwrap();

    let mut kinds = Vec::new();
    while let Ok(Ok(event)) =
        tokio::time::timeout(Duration::from_secs(600), events.recv()).await
    {
        kinds.push(event.kind());
    }

    assert_eq!(kinds, vec!["ride_requested", "driver_matched"]);
    assert_eq!(state.metrics.broadcast_tasks_pending.get(), 0);
}

#[tokio::test]
async fn concurrent_first_requests_create_one_order() {
    let fx = yielding_fixture();
    fx.coordinator.route_plans().put("p-1", &plan()).await.unwrap();

    let (a, b) = tokio::join!(
        fx.coordinator.request_match("p-1", "cash"),
        fx.coordinator.request_match("p-1", "cash"),
    );

    assert_eq!([&a, &b].iter().filter(|r| r.is_ok()).count(), 1);
    assert!([&a, &b]
        .iter()
        .any(|r| matches!(r, Err(AppError::Conflict(_)))));

    let active = fx
        .orders
        .find_orders(
            &OrderFilter::default()
                .passenger("p-1")
                .status_in(&OrderStatus::ACTIVE),
        )
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(fx.queue.tasks.lock().unwrap().len(), 1);
    assert_eq!(fx.publisher.events.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_supersedes_of_a_stale_order_apply_once() {
    let fx = yielding_fixture();
    let mut stale = Order::new(
        "ride-stale".to_string(),
        "p-1".to_string(),
        plan(),
        PaymentMethod::Qris,
    );
    stale.created_at = Utc::now() - chrono::Duration::minutes(20);
    fx.orders.create_order(stale).await.unwrap();
    fx.coordinator.route_plans().put("p-1", &plan()).await.unwrap();

    let (a, b) = tokio::join!(
        fx.coordinator.request_match("p-1", "cash"),
        fx.coordinator.request_match("p-1", "cash"),
    );

    let winners: Vec<_> = [&a, &b].into_iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].order_id, "ride-stale");
    assert!([&a, &b]
        .iter()
        .any(|r| matches!(r, Err(AppError::Conflict(_)))));

    let order = stored(&fx.orders, "ride-stale").await;
    assert_eq!(order.revision, 1);
    assert_eq!(order.payment_method, PaymentMethod::Cash);
    assert_eq!(fx.orders.len(), 1);
    assert_eq!(fx.queue.tasks.lock().unwrap().len(), 1);
    assert_eq!(fx.publisher.events.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn direct_payment_below_minimum_is_rejected() {
    let fx = fixture();
    let mut cheap = plan();
    cheap.min_price = 500.0;
    cheap.max_price = 999.0;
    fx.coordinator.route_plans().put("p-1", &cheap).await.unwrap();

    let err = fx.coordinator.request_match("p-1", "cash").await.unwrap_err();

    assert_eq!(err.category(), "validation");
    assert!(fx.orders.is_empty());
    assert!(fx.queue.tasks.lock().unwrap().is_empty());
    assert!(fx.publisher.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn direct_payment_above_maximum_is_rejected() {
    let fx = fixture();
    let mut pricey = plan();
    pricey.max_price = 10_000_001.0;
    fx.coordinator.route_plans().put("p-1", &pricey).await.unwrap();

    let err = fx.coordinator.request_match("p-1", "qris").await.unwrap_err();

    assert_eq!(err.category(), "validation");
    assert!(fx.orders.is_empty());
    assert!(fx.queue.tasks.lock().unwrap().is_empty());
}

#[tokio::test]
async fn direct_payment_band_bounds_are_inclusive() {
    let fx = fixture();
    let mut lowest = plan();
    lowest.min_price = 1_000.0;
    lowest.max_price = 1_000.0;
    fx.coordinator.route_plans().put("p-1", &lowest).await.unwrap();
    fx.coordinator.request_match("p-1", "cash").await.unwrap();

    let mut highest = plan();
    highest.max_price = 10_000_000.0;
    fx.coordinator.route_plans().put("p-2", &highest).await.unwrap();
    fx.coordinator.request_match("p-2", "qr").await.unwrap();

    assert_eq!(fx.orders.len(), 2);
}

#[tokio::test]
async fn complete_without_trip_tracker_is_not_found() {
    let fx = fixture();
    let before = seed(&fx.orders, "ride-1", OrderStatus::OnGoing, Some("d-1")).await;

    let err = fx
        .coordinator
        .complete("ride-1", "d-1", 5.0)
        .await
        .unwrap_err();

    assert_eq!(err.category(), "not_found");
    assert_untouched(&before, &stored(&fx.orders, "ride-1").await);
    assert!(fx.publisher.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn complete_with_tracker_of_another_driver_is_conflict() {
    let fx = fixture();
    let before = seed(&fx.orders, "ride-1", OrderStatus::OnGoing, Some("d-1")).await;
    let tracker = TripTracker {
        order_id: "ride-1".to_string(),
        driver_id: "d-2".to_string(),
        updated_at: Utc::now(),
    };
    fx.cache
        .set(
            &trip_tracker_key("ride-1"),
            serde_json::to_string(&tracker).unwrap(),
            Duration::from_secs(3600),
        )
        .await
        .unwrap();

    let err = fx
        .coordinator
        .complete("ride-1", "d-1", 5.0)
        .await
        .unwrap_err();

    assert_eq!(err.category(), "conflict");
    assert_untouched(&before, &stored(&fx.orders, "ride-1").await);
    assert!(fx.cache.get(&trip_tracker_key("ride-1")).await.unwrap().is_some());
}

#[tokio::test]
async fn pick_up_is_rejected_outside_accepted() {
    let fx = fixture();
    let cases = [
        ("ride-done", OrderStatus::Completed, Some("d-1")),
        ("ride-cancelled", OrderStatus::Cancelled, Some("d-1")),
        ("ride-riding", OrderStatus::OnGoing, Some("d-1")),
        ("ride-waiting", OrderStatus::Requested, None),
        ("ride-matching", OrderStatus::Matching, None),
    ];

    for (order_id, status, driver_id) in cases {
        let before = seed(&fx.orders, order_id, status, driver_id).await;

        let err = fx.coordinator.pick_up(order_id, "d-1").await.unwrap_err();

        assert_eq!(err.category(), "conflict", "{status}");
        assert_untouched(&before, &stored(&fx.orders, order_id).await);
    }
    assert!(fx.publisher.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn offer_pickup_on_assigned_order_is_conflict() {
    let fx = fixture();
    let before = seed(&fx.orders, "ride-1", OrderStatus::Accepted, Some("d-1")).await;

    let err = fx
        .coordinator
        .offer_pickup("ride-1", "d-2")
        .await
        .unwrap_err();

    assert_eq!(err.category(), "conflict");
    assert_untouched(&before, &stored(&fx.orders, "ride-1").await);
    assert!(fx
        .cache
        .keys_with_prefix(&pickup_offer_prefix("ride-1"))
        .await
        .unwrap()
        .is_empty());
}
