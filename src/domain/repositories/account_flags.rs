use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::account_flags::AccountFlagEntity;

#[async_trait]
#[automock]
pub trait AccountFlagRepository {
    /// Upserts the user's flag row, incrementing both `expired_payment_count`
    /// and `total_payment_attempts` by one. Returns the row after the update.
    async fn record_expired_attempt(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<AccountFlagEntity>;

    /// Flips `is_flagged` false→true. Guarded on `is_flagged = false` so the
    /// flag only ever flips once; returns rows affected.
    async fn mark_flagged(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<usize>;

    /// Resets `events_created_last_hour` and `is_rate_limited` for users whose
    /// `last_event_created_at` is older than `cutoff`. Safe no-op on rows
    /// already at zero. Returns rows touched.
    async fn reset_stale_hourly_counters(
        &self,
        cutoff: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<usize>;
}
