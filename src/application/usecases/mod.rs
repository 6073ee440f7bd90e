pub mod archival;
pub mod lifecycle_transition;
pub mod payment_expiration;
pub mod rate_limit;
pub mod state_transition;
