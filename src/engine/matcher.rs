use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use crate::error::AppError;
use crate::models::driver::{DriverCandidate, DriverStatus, GeoPoint};
use crate::store::{AvailabilityStore, GeoIndex};

/// Finds online, recently seen drivers around a pickup point, nearest first.
#[derive(Clone)]
pub struct GeoMatcher {
    geo: Arc<dyn GeoIndex>,
    availability: Arc<dyn AvailabilityStore>,
    radius_km: f64,
    freshness: Duration,
}

impl GeoMatcher {
    pub fn new(
        geo: Arc<dyn GeoIndex>,
        availability: Arc<dyn AvailabilityStore>,
        radius_km: f64,
        freshness: Duration,
    ) -> Self {
        Self {
            geo,
            availability,
            radius_km,
            freshness,
        }
    }

    pub async fn find_candidates(
        &self,
        pickup: GeoPoint,
    ) -> Result<Vec<DriverCandidate>, AppError> {
        let hits = self.geo.within_radius(pickup, self.radius_km).await?;
        let freshness = chrono::Duration::from_std(self.freshness)
            .map_err(|err| AppError::Internal(format!("invalid freshness window: {err}")))?;
        let cutoff = Utc::now() - freshness;

        let mut candidates = Vec::with_capacity(hits.len());
        for hit in hits {
            let Some(record) = self.availability.availability(&hit.driver_id).await? else {
                continue;
            };

            if record.status != DriverStatus::Online {
                debug!(driver_id = %hit.driver_id, status = ?record.status, "skipping busy driver");
                continue;
            }
            if record.last_seen_at < cutoff {
                debug!(driver_id = %hit.driver_id, "skipping stale driver");
                continue;
            }

            candidates.push(DriverCandidate::from(hit));
        }

        Ok(candidates)
    }
}
