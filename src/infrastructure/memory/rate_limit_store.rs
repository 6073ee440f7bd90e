use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::{
    repositories::rate_limit::RateLimitStore,
    value_objects::rate_limit::{RateLimitKey, RateLimitPolicy},
};

#[derive(Debug, Clone, Copy)]
struct FixedWindow {
    window_start: DateTime<Utc>,
    count: u32,
}

/// Process-local counters behind one mutex, which also gives each key its
/// atomic increment-and-check. Volatile by design: counters reset on restart
/// and are only correct when all traffic for a key lands on this process.
pub struct InMemoryRateLimitStore {
    windows: Mutex<HashMap<RateLimitKey, FixedWindow>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryRateLimitStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn increment_and_check(
        &self,
        key: RateLimitKey,
        policy: RateLimitPolicy,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let mut windows = self
            .windows
            .lock()
            .map_err(|_| anyhow!("rate limit window lock poisoned"))?;

        let window = windows.entry(key).or_insert(FixedWindow {
            window_start: now,
            count: 0,
        });

        // Fixed window: strictly past the window span the counter starts over.
        if now - window.window_start > Duration::milliseconds(policy.window_ms) {
            window.window_start = now;
            window.count = 0;
        }

        window.count += 1;
        Ok(window.count <= policy.max_requests)
    }
}
