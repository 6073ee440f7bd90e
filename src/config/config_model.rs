use crate::application::usecases::rate_limit::RateLimitPolicies;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub database: Database,
    pub jobs: Jobs,
    pub rate_limit: RateLimitPolicies,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Jobs {
    pub payment_expiration_interval_secs: u64,
    pub lifecycle_transition_interval_secs: u64,
}
