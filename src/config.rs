use std::env;
use std::time::Duration;

use crate::engine::policy::MatchingPolicy;
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub task_queue_size: usize,
    pub event_buffer_size: usize,
    pub policy: MatchingPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        let defaults = MatchingPolicy::default();
        let policy = MatchingPolicy {
            search_radius_km: parse_or_default("SEARCH_RADIUS_KM", defaults.search_radius_km)?,
            driver_freshness: secs_or_default("DRIVER_FRESHNESS_SECS", defaults.driver_freshness)?,
            matching_timeout: secs_or_default("MATCHING_TIMEOUT_SECS", defaults.matching_timeout)?,
            broadcast_delay: secs_or_default("BROADCAST_DELAY_SECS", defaults.broadcast_delay)?,
            broadcast_max_attempts: parse_or_default(
                "BROADCAST_MAX_ATTEMPTS",
                defaults.broadcast_max_attempts,
            )?,
            route_plan_ttl: secs_or_default("ROUTE_PLAN_TTL_SECS", defaults.route_plan_ttl)?,
            price_per_km: parse_or_default("PRICE_PER_KM", defaults.price_per_km)?,
            ..defaults
        };

        if policy.broadcast_max_attempts == 0 {
            return Err(AppError::Internal(
                "invalid BROADCAST_MAX_ATTEMPTS: must be > 0".to_string(),
            ));
        }

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            task_queue_size: parse_or_default("TASK_QUEUE_SIZE", 1024)?,
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", 1024)?,
            policy,
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}

fn secs_or_default(key: &str, default: Duration) -> Result<Duration, AppError> {
    parse_or_default(key, default.as_secs()).map(Duration::from_secs)
}
