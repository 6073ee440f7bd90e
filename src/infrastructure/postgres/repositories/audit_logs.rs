use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain::{
        entities::audit_logs::{AuditLogEntity, NewAuditRecord},
        repositories::audit_logs::AuditLogRepository,
        value_objects::enums::audit_actions::AuditAction,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::audit_logs},
};

pub struct AuditLogPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl AuditLogPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl AuditLogRepository for AuditLogPostgres {
    async fn append(&self, record: NewAuditRecord) -> Result<i64> {
        // Diesel is synchronous; run DB work on the blocking threadpool to
        // avoid stalling Tokio under load.
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<i64> {
            let mut conn = db_pool.get()?;

            let entity = record.into_insert_entity(Utc::now());
            let id = insert_into(audit_logs::table)
                .values(&entity)
                .returning(audit_logs::id)
                .get_result::<i64>(&mut conn)?;

            Ok(id)
        })
        .await??)
    }

    async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<AuditLogEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<AuditLogEntity>> {
            let mut conn = db_pool.get()?;

            let result = audit_logs::table
                .select(AuditLogEntity::as_select())
                .filter(audit_logs::event_id.eq(event_id))
                .order(audit_logs::created_at.desc())
                .load::<AuditLogEntity>(&mut conn)?;

            Ok(result)
        })
        .await??)
    }

    async fn list_by_action(&self, action: AuditAction) -> Result<Vec<AuditLogEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<AuditLogEntity>> {
            let mut conn = db_pool.get()?;

            let result = audit_logs::table
                .select(AuditLogEntity::as_select())
                .filter(audit_logs::action.eq(action.to_string()))
                .order(audit_logs::created_at.desc())
                .load::<AuditLogEntity>(&mut conn)?;

            Ok(result)
        })
        .await??)
    }
}
