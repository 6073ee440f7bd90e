use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;

use crate::domain::value_objects::rate_limit::{RateLimitKey, RateLimitPolicy};

/// Counter store with an atomic increment-and-check per key. The in-process
/// implementation is volatile; a multi-instance deployment swaps in a shared
/// store behind this same interface.
#[async_trait]
#[automock]
pub trait RateLimitStore {
    /// Records one hit against `key` and reports whether the key is still
    /// under `policy.max_requests` for the current fixed window.
    async fn increment_and_check(
        &self,
        key: RateLimitKey,
        policy: RateLimitPolicy,
        now: DateTime<Utc>,
    ) -> Result<bool>;
}
