use prometheus::{Encoder, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub ride_orders_total: IntCounterVec,
    pub order_transitions_total: IntCounterVec,
    pub broadcasts_total: IntCounterVec,
    pub broadcast_tasks_pending: IntGauge,
    pub match_latency_seconds: HistogramVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let ride_orders_total = IntCounterVec::new(
            Opts::new("ride_orders_total", "Match requests by outcome"),
            &["outcome"],
        )
        .expect("valid ride_orders_total metric");

        let order_transitions_total = IntCounterVec::new(
            Opts::new(
                "order_transitions_total",
                "Conditional order transitions by target status and outcome",
            ),
            &["transition", "outcome"],
        )
        .expect("valid order_transitions_total metric");

        let broadcasts_total = IntCounterVec::new(
            Opts::new("broadcasts_total", "Broadcast task firings by outcome"),
            &["outcome"],
        )
        .expect("valid broadcasts_total metric");

        let broadcast_tasks_pending = IntGauge::new(
            "broadcast_tasks_pending",
            "Broadcast tasks waiting on their delay",
        )
        .expect("valid broadcast_tasks_pending metric");

        let match_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "match_latency_seconds",
                "Latency of match requests in seconds",
            ),
            &["outcome"],
        )
        .expect("valid match_latency_seconds metric");

        registry
            .register(Box::new(ride_orders_total.clone()))
            .expect("register ride_orders_total");
        registry
            .register(Box::new(order_transitions_total.clone()))
            .expect("register order_transitions_total");
        registry
            .register(Box::new(broadcasts_total.clone()))
            .expect("register broadcasts_total");
        registry
            .register(Box::new(broadcast_tasks_pending.clone()))
            .expect("register broadcast_tasks_pending");
        registry
            .register(Box::new(match_latency_seconds.clone()))
            .expect("register match_latency_seconds");

        Self {
            registry,
            ride_orders_total,
            order_transitions_total,
            broadcasts_total,
            broadcast_tasks_pending,
            match_latency_seconds,
        }
    }

    pub fn transition(&self, transition: &str, applied: bool) {
        let outcome = if applied { "applied" } else { "conflict" };
        self.order_transitions_total
            .with_label_values(&[transition, outcome])
            .inc();
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
