use async_trait::async_trait;

use crate::error::AppError;
use crate::geo::haversine_km;
use crate::models::route::{Location, RouteCandidate};

/// Source of drivable routes between two points.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn routes(
        &self,
        origin: &Location,
        destination: &Location,
    ) -> Result<Vec<RouteCandidate>, AppError>;
}

const AVERAGE_SPEED_KMH: f64 = 30.0;
const DETOUR_FACTOR: f64 = 1.3;

/// Offline estimator: a direct route plus one detour alternative.
#[derive(Debug, Default, Clone)]
pub struct StraightLineRouteProvider;

impl StraightLineRouteProvider {
    fn candidate(distance_km: f64) -> RouteCandidate {
        RouteCandidate {
            distance_m: distance_km * 1000.0,
            duration_s: distance_km / AVERAGE_SPEED_KMH * 3600.0,
        }
    }
}

#[async_trait]
impl RouteProvider for StraightLineRouteProvider {
    async fn routes(
        &self,
        origin: &Location,
        destination: &Location,
    ) -> Result<Vec<RouteCandidate>, AppError> {
        let direct_km = haversine_km(&origin.point(), &destination.point());
        if direct_km < 0.01 {
            return Ok(Vec::new());
        }

        Ok(vec![
            Self::candidate(direct_km),
            Self::candidate(direct_km * DETOUR_FACTOR),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::{RouteProvider, StraightLineRouteProvider};
    use crate::models::route::Location;

    fn location(lat: f64, lng: f64) -> Location {
        Location {
            lat,
            lng,
            address: String::new(),
        }
    }

    #[tokio::test]
    async fn detour_is_longer_than_direct_route() {
        let routes = StraightLineRouteProvider
            .routes(&location(-6.2000, 106.8166), &location(-6.2250, 106.8000))
            .await
            .unwrap();

        assert_eq!(routes.len(), 2);
        assert!(routes[1].distance_m > routes[0].distance_m);
        assert!(routes[1].duration_s > routes[0].duration_s);
    }

    #[tokio::test]
    async fn identical_points_have_no_route() {
        let here = location(-6.2000, 106.8166);
        let routes = StraightLineRouteProvider.routes(&here, &here).await.unwrap();
        assert!(routes.is_empty());
    }
}
