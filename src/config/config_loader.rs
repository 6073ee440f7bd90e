use anyhow::{Context, Result};

use crate::application::usecases::rate_limit::RateLimitPolicies;
use crate::domain::value_objects::rate_limit::RateLimitPolicy;

use super::config_model::{Database, DotEnvyConfig, Jobs};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let jobs = Jobs {
        payment_expiration_interval_secs: env_or_default(
            "PAYMENT_EXPIRATION_INTERVAL_SECS",
            "300",
        )?,
        lifecycle_transition_interval_secs: env_or_default(
            "LIFECYCLE_TRANSITION_INTERVAL_SECS",
            "3600",
        )?,
    };

    let rate_limit = RateLimitPolicies {
        client_addr: RateLimitPolicy {
            max_requests: env_or_default("RATE_LIMIT_CLIENT_ADDR_MAX", "30")?,
            window_ms: env_or_default("RATE_LIMIT_CLIENT_ADDR_WINDOW_MS", "60000")?,
        },
        event: RateLimitPolicy {
            max_requests: env_or_default("RATE_LIMIT_EVENT_MAX", "120")?,
            window_ms: env_or_default("RATE_LIMIT_EVENT_WINDOW_MS", "60000")?,
        },
        phone: RateLimitPolicy {
            max_requests: env_or_default("RATE_LIMIT_PHONE_MAX", "5")?,
            window_ms: env_or_default("RATE_LIMIT_PHONE_WINDOW_MS", "3600000")?,
        },
    };

    Ok(DotEnvyConfig {
        database,
        jobs,
        rate_limit,
    })
}

fn env_or_default<T>(key: &str, default: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .with_context(|| format!("{} is invalid", key))
}
