use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::events::EventEntity;

/// Guarded single-row payment/lifecycle mutations. Every method returns the
/// number of rows affected; zero means a concurrent path already applied the
/// transition (or the guard refused it) and the caller treats that as success.
#[async_trait]
#[automock]
pub trait EventStateRepository {
    async fn find_by_id(&self, event_id: Uuid) -> Result<Option<EventEntity>>;

    /// `payment_state=PAID` plus `lifecycle_state=SCHEDULED`, guarded on the
    /// row still being unpaid DRAFT.
    async fn mark_paid_and_scheduled(&self, event_id: Uuid, now: DateTime<Utc>) -> Result<usize>;

    /// `payment_state=PAID` only; lifecycle left for the Lifecycle Job.
    async fn mark_paid(&self, event_id: Uuid, now: DateTime<Utc>) -> Result<usize>;

    /// `payment_state=PENDING`, guarded on the row being NO_PAID so a paid
    /// event can never regress to a checkout state.
    async fn mark_pending(&self, event_id: Uuid, now: DateTime<Utc>) -> Result<usize>;

    /// `payment_state=NO_PAID` AND `lifecycle_state=DRAFT` in one UPDATE.
    async fn revert_to_draft(&self, event_id: Uuid, now: DateTime<Utc>) -> Result<usize>;

    /// `lifecycle_state=SCHEDULED`, guarded on the row being a PAID DRAFT.
    async fn mark_scheduled(&self, event_id: Uuid, now: DateTime<Utc>) -> Result<usize>;
}
