use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::audit_logs::{AuditLogEntity, NewAuditRecord};
use crate::domain::value_objects::enums::audit_actions::AuditAction;

/// Append-only ledger. Records are never mutated or deleted by this subsystem.
#[async_trait]
#[automock]
pub trait AuditLogRepository {
    async fn append(&self, record: NewAuditRecord) -> Result<i64>;

    /// Read surface for dashboard/reporting consumers.
    async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<AuditLogEntity>>;

    async fn list_by_action(&self, action: AuditAction) -> Result<Vec<AuditLogEntity>>;
}
