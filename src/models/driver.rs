use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriverStatus {
    Online,
    OnTrip,
    Offline,
}

/// Live availability of a driver, refreshed by heartbeats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityRecord {
    pub driver_id: String,
    pub status: DriverStatus,
    pub last_seen_at: DateTime<Utc>,
}

/// Raw hit from the geo index, before availability filtering.
#[derive(Debug, Clone)]
pub struct GeoHit {
    pub driver_id: String,
    pub location: GeoPoint,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverCandidate {
    pub driver_id: String,
    pub location: GeoPoint,
    pub distance_km: f64,
}

impl From<GeoHit> for DriverCandidate {
    fn from(hit: GeoHit) -> Self {
        Self {
            driver_id: hit.driver_id,
            location: hit.location,
            distance_km: hit.distance_km,
        }
    }
}
