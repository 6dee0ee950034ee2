use std::sync::Arc;
use std::time::Duration;

use crate::error::AppError;
use crate::models::route::RoutePlan;
use crate::store::Cache;

pub fn route_plan_key(passenger_id: &str) -> String {
    format!("USER:ROUTE:{passenger_id}")
}

/// Last quote per passenger. Not rebuildable from durable storage: a missing
/// plan means the passenger has to quote again.
#[derive(Clone)]
pub struct RoutePlanCache {
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl RoutePlanCache {
    pub fn new(cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    pub async fn put(&self, passenger_id: &str, plan: &RoutePlan) -> Result<(), AppError> {
        let body = serde_json::to_string(plan)?;
        self.cache
            .set(&route_plan_key(passenger_id), body, self.ttl)
            .await
    }

    pub async fn get(&self, passenger_id: &str) -> Result<RoutePlan, AppError> {
        let raw = self
            .cache
            .get(&route_plan_key(passenger_id))
            .await?
            .filter(|raw| !raw.is_empty())
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "no route plan for passenger {passenger_id}, please submit locations again"
                ))
            })?;

        serde_json::from_str(&raw)
            .map_err(|err| AppError::Internal(format!("corrupt route plan: {err}")))
    }

    pub async fn remove(&self, passenger_id: &str) -> Result<(), AppError> {
        self.cache.delete(&route_plan_key(passenger_id)).await
    }
}
