use serde::{Deserialize, Serialize};

use crate::models::driver::GeoPoint;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub address: String,
}

impl Location {
    pub fn point(&self) -> GeoPoint {
        GeoPoint {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

/// One alternative route returned by the route provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RouteCandidate {
    pub distance_m: f64,
    pub duration_s: f64,
}

/// Priced quote for a trip, cached per passenger until a match is requested.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoutePlan {
    pub origin: Location,
    pub destination: Location,
    pub min_price: f64,
    pub max_price: f64,
    pub best_route_km: f64,
    pub best_route_price: f64,
    pub best_route_duration: String,
    pub duration_minutes: u32,
}
