use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::payment_orders::PaymentOrderEntity;

#[async_trait]
#[automock]
pub trait PaymentOrderRepository {
    /// Non-terminal orders whose payment window has lapsed
    /// (`status IN (pending, processing) AND expires_at < now`).
    async fn list_lapsed_orders(&self, now: DateTime<Utc>) -> Result<Vec<PaymentOrderEntity>>;

    /// Terminates one order as `expired`, guarded by the same non-terminal
    /// predicate. Zero rows affected means the verifier won the race.
    async fn mark_expired(&self, order_id: Uuid) -> Result<usize>;
}
