use crate::error::AppError;
use crate::models::route::{Location, RouteCandidate, RoutePlan};

/// Prices every candidate route and picks the cheapest as the best route.
pub fn price_routes(
    origin: Location,
    destination: Location,
    candidates: &[RouteCandidate],
    price_per_km: f64,
) -> Result<RoutePlan, AppError> {
    let mut min_price = f64::MAX;
    let mut max_price = f64::MIN;
    let mut best: Option<(f64, f64, f64)> = None;

    for candidate in candidates {
        let distance_km = candidate.distance_m / 1000.0;
        let price = distance_km * price_per_km;

        min_price = min_price.min(price);
        max_price = max_price.max(price);

        if best.map_or(true, |(_, best_price, _)| price < best_price) {
            best = Some((distance_km, price, candidate.duration_s));
        }
    }

    let (best_route_km, best_route_price, duration_s) =
        best.ok_or_else(|| AppError::NotFound("no routes found".to_string()))?;
    let duration_minutes = (duration_s / 60.0).ceil().max(0.0) as u32;

    Ok(RoutePlan {
        origin,
        destination,
        min_price,
        max_price,
        best_route_km,
        best_route_price,
        best_route_duration: format_duration(duration_minutes),
        duration_minutes,
    })
}

pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;

    match (hours, rest) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}
