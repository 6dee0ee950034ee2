use std::sync::Arc;

use tokio::sync::mpsc;

use crate::engine::coordinator::{Collaborators, OrderCoordinator};
use crate::engine::policy::MatchingPolicy;
use crate::engine::queue::DelayQueue;
use crate::geo::route::StraightLineRouteProvider;
use crate::messaging::bus::BroadcastEventBus;
use crate::messaging::TaskQueue;
use crate::models::ride_request::Task;
use crate::observability::metrics::Metrics;
use crate::store::memory::{
    InMemoryCache, InMemoryDriverRegistry, InMemoryOrderStore, InMemoryWallets,
};
use crate::store::WalletStore;

pub struct AppState {
    pub coordinator: OrderCoordinator,
    pub orders: Arc<InMemoryOrderStore>,
    pub drivers: Arc<InMemoryDriverRegistry>,
    pub wallets: Arc<dyn WalletStore>,
    pub cache: Arc<InMemoryCache>,
    pub events: BroadcastEventBus,
    pub queue: Arc<dyn TaskQueue>,
    pub metrics: Metrics,
}

impl AppState {
    /// Wires every collaborator with its in-memory implementation. The
    /// returned receiver feeds the broadcast worker.
    pub fn new(
        policy: MatchingPolicy,
        task_queue_size: usize,
        event_buffer_size: usize,
    ) -> (Self, mpsc::Receiver<Task>) {
        let metrics = Metrics::new();
        let orders = Arc::new(InMemoryOrderStore::new());
        let drivers = Arc::new(InMemoryDriverRegistry::new());
        let cache = Arc::new(InMemoryCache::new());
        let wallets: Arc<dyn WalletStore> = Arc::new(InMemoryWallets::new());
        let events = BroadcastEventBus::new(event_buffer_size);
        let (delay_queue, task_rx) = DelayQueue::new(task_queue_size, metrics.clone());
        let queue: Arc<dyn TaskQueue> = Arc::new(delay_queue);

        let coordinator = OrderCoordinator::new(
            Collaborators {
                orders: orders.clone(),
                geo: drivers.clone(),
                availability: drivers.clone(),
                cache: cache.clone(),
                wallets: wallets.clone(),
                routes: Arc::new(StraightLineRouteProvider),
                publisher: Arc::new(events.clone()),
                queue: queue.clone(),
            },
            policy,
            metrics.clone(),
        );

        (
            Self {
                coordinator,
                orders,
                drivers,
                wallets,
                cache,
                events,
                queue,
                metrics,
            },
            task_rx,
        )
    }
}
