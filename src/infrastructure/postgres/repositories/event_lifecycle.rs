use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::{RunQueryDsl, prelude::*, update};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain::{
        entities::events::EventEntity,
        repositories::event_lifecycle::EventLifecycleRepository,
        value_objects::enums::{lifecycle_states::LifecycleState, payment_states::PaymentState},
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::events},
};

pub struct EventLifecyclePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl EventLifecyclePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl EventLifecycleRepository for EventLifecyclePostgres {
    async fn list_due_scheduled(&self, date: NaiveDate) -> Result<Vec<EventEntity>> {
        // Diesel is synchronous; run DB work on the blocking threadpool to
        // avoid stalling Tokio under load.
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<EventEntity>> {
            let mut conn = db_pool.get()?;

            let result = events::table
                .select(EventEntity::as_select())
                .filter(events::payment_state.eq(PaymentState::Paid.to_string()))
                .filter(events::lifecycle_state.eq(LifecycleState::Scheduled.to_string()))
                .filter(events::event_date.le(date))
                .order(events::event_date.asc())
                .load::<EventEntity>(&mut conn)?;

            Ok(result)
        })
        .await??)
    }

    async fn list_live(&self, date: NaiveDate) -> Result<Vec<EventEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<EventEntity>> {
            let mut conn = db_pool.get()?;

            let result = events::table
                .select(EventEntity::as_select())
                .filter(events::lifecycle_state.eq(LifecycleState::Live.to_string()))
                .filter(events::event_date.le(date))
                .order(events::event_date.asc())
                .load::<EventEntity>(&mut conn)?;

            Ok(result)
        })
        .await??)
    }

    async fn list_cooldown_elapsed(&self, now: DateTime<Utc>) -> Result<Vec<EventEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<EventEntity>> {
            let mut conn = db_pool.get()?;

            let result = events::table
                .select(EventEntity::as_select())
                .filter(events::lifecycle_state.eq_any([
                    LifecycleState::Ended.to_string(),
                    LifecycleState::Cooling.to_string(),
                ]))
                .filter(events::cooldown_until.lt(now))
                .order(events::cooldown_until.asc())
                .load::<EventEntity>(&mut conn)?;

            Ok(result)
        })
        .await??)
    }

    async fn mark_live(&self, event_ids: Vec<Uuid>, now: DateTime<Utc>) -> Result<usize> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<usize> {
            let mut conn = db_pool.get()?;

            // Re-guarded on PAID + SCHEDULED so an overlapping run or a
            // payment reversion between select and update stays a no-op.
            let affected = update(
                events::table
                    .filter(events::id.eq_any(event_ids))
                    .filter(events::payment_state.eq(PaymentState::Paid.to_string()))
                    .filter(events::lifecycle_state.eq(LifecycleState::Scheduled.to_string())),
            )
            .set((
                events::lifecycle_state.eq(LifecycleState::Live.to_string()),
                events::updated_at.eq(now),
            ))
            .execute(&mut conn)?;

            Ok(affected)
        })
        .await??)
    }

    async fn mark_ended(
        &self,
        event_id: Uuid,
        cooldown_until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<usize> {
            let mut conn = db_pool.get()?;

            // `cooldown_until IS NULL` keeps the deadline write-once.
            let affected = update(
                events::table
                    .filter(events::id.eq(event_id))
                    .filter(events::lifecycle_state.eq(LifecycleState::Live.to_string()))
                    .filter(events::cooldown_until.is_null()),
            )
            .set((
                events::lifecycle_state.eq(LifecycleState::Ended.to_string()),
                events::cooldown_until.eq(cooldown_until),
                events::updated_at.eq(now),
            ))
            .execute(&mut conn)?;

            Ok(affected)
        })
        .await??)
    }

    async fn mark_disabled(&self, event_id: Uuid, now: DateTime<Utc>) -> Result<usize> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<usize> {
            let mut conn = db_pool.get()?;

            let affected = update(
                events::table
                    .filter(events::id.eq(event_id))
                    .filter(events::lifecycle_state.eq_any([
                        LifecycleState::Ended.to_string(),
                        LifecycleState::Cooling.to_string(),
                    ])),
            )
            .set((
                events::lifecycle_state.eq(LifecycleState::Disabled.to_string()),
                events::disabled_at.eq(now),
                events::updated_at.eq(now),
            ))
            .execute(&mut conn)?;

            Ok(affected)
        })
        .await??)
    }

    async fn store_archived_summary(
        &self,
        event_id: Uuid,
        summary: serde_json::Value,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<usize> {
            let mut conn = db_pool.get()?;

            let affected = update(events::table.filter(events::id.eq(event_id)))
                .set((
                    events::archived_summary.eq(summary),
                    events::updated_at.eq(now),
                ))
                .execute(&mut conn)?;

            Ok(affected)
        })
        .await??)
    }
}
