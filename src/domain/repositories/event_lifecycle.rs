use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::events::EventEntity;

/// Batch selections and guarded transitions used by the hourly lifecycle
/// sweep. Selection predicates are self-guarding: a row that already
/// transitioned no longer matches, so overlapping runs are benign no-ops.
#[async_trait]
#[automock]
pub trait EventLifecycleRepository {
    /// PAID SCHEDULED events dated up to `date`; the caller applies the exact
    /// start-instant comparison against its "now" snapshot.
    async fn list_due_scheduled(&self, date: NaiveDate) -> Result<Vec<EventEntity>>;

    /// LIVE events dated up to `date`.
    async fn list_live(&self, date: NaiveDate) -> Result<Vec<EventEntity>>;

    /// ENDED or COOLING events whose cooldown window has elapsed.
    async fn list_cooldown_elapsed(&self, now: DateTime<Utc>) -> Result<Vec<EventEntity>>;

    /// Bulk SCHEDULED→LIVE, re-guarded on PAID + SCHEDULED. Returns the number
    /// of rows actually transitioned.
    async fn mark_live(&self, event_ids: Vec<Uuid>, now: DateTime<Utc>) -> Result<usize>;

    /// LIVE→ENDED with the write-once cooldown deadline; guarded on
    /// `cooldown_until IS NULL` so it is never recomputed.
    async fn mark_ended(
        &self,
        event_id: Uuid,
        cooldown_until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<usize>;

    /// ENDED/COOLING→DISABLED, stamping `disabled_at`.
    async fn mark_disabled(&self, event_id: Uuid, now: DateTime<Utc>) -> Result<usize>;

    /// Persists the final statistics blob. Must be durable before the caller
    /// considers the event archived.
    async fn store_archived_summary(
        &self,
        event_id: Uuid,
        summary: serde_json::Value,
        now: DateTime<Utc>,
    ) -> Result<usize>;
}
