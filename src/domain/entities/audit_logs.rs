use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::value_objects::enums::audit_actions::AuditAction;
use crate::infrastructure::postgres::schema::audit_logs;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = audit_logs)]
pub struct AuditLogEntity {
    pub id: i64,
    pub event_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = audit_logs)]
pub struct InsertAuditLogEntity {
    pub event_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Ledger entry as produced by the usecases, before it is bound to a table row.
#[derive(Debug, Clone)]
pub struct NewAuditRecord {
    pub event_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub action: AuditAction,
    pub details: serde_json::Value,
}

impl NewAuditRecord {
    pub fn into_insert_entity(self, created_at: DateTime<Utc>) -> InsertAuditLogEntity {
        InsertAuditLogEntity {
            event_id: self.event_id,
            user_id: self.user_id,
            action: self.action.to_string(),
            details: self.details,
            created_at,
        }
    }
}
