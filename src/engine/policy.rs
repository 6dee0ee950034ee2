use std::time::Duration;

/// Tunables for matching, broadcasting and quoting.
#[derive(Debug, Clone)]
pub struct MatchingPolicy {
    pub search_radius_km: f64,
    pub driver_freshness: Duration,
    pub matching_timeout: Duration,
    pub broadcast_delay: Duration,
    pub broadcast_max_attempts: u32,
    pub first_task_max_retry: u32,
    pub successor_task_max_retry: u32,
    pub task_retry_delay: Duration,
    pub route_plan_ttl: Duration,
    pub pickup_offer_ttl: Duration,
    pub picking_passenger_ttl: Duration,
    pub price_per_km: f64,
    pub min_direct_payment: f64,
    pub max_direct_payment: f64,
}

impl Default for MatchingPolicy {
    fn default() -> Self {
        Self {
            search_radius_km: 3.0,
            driver_freshness: Duration::from_secs(2 * 60),
            matching_timeout: Duration::from_secs(15 * 60),
            broadcast_delay: Duration::from_secs(60),
            broadcast_max_attempts: 5,
            first_task_max_retry: 5,
            successor_task_max_retry: 1,
            task_retry_delay: Duration::from_secs(10),
            route_plan_ttl: Duration::from_secs(60 * 60),
            pickup_offer_ttl: Duration::from_secs(5 * 60),
            picking_passenger_ttl: Duration::from_secs(2 * 60 * 60),
            price_per_km: 3_000.0,
            min_direct_payment: 1_000.0,
            max_direct_payment: 10_000_000.0,
        }
    }
}
