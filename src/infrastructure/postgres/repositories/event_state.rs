use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{OptionalExtension, RunQueryDsl, prelude::*, update};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain::{
        entities::events::EventEntity,
        repositories::event_state::EventStateRepository,
        value_objects::enums::{lifecycle_states::LifecycleState, payment_states::PaymentState},
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::events},
};

pub struct EventStatePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl EventStatePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl EventStateRepository for EventStatePostgres {
    async fn find_by_id(&self, event_id: Uuid) -> Result<Option<EventEntity>> {
        // Diesel is synchronous; run DB work on the blocking threadpool to
        // avoid stalling Tokio under load.
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<EventEntity>> {
            let mut conn = db_pool.get()?;

            let result = events::table
                .select(EventEntity::as_select())
                .filter(events::id.eq(event_id))
                .first::<EventEntity>(&mut conn)
                .optional()?;

            Ok(result)
        })
        .await??)
    }

    async fn mark_paid_and_scheduled(&self, event_id: Uuid, now: DateTime<Utc>) -> Result<usize> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<usize> {
            let mut conn = db_pool.get()?;

            let affected = update(
                events::table
                    .filter(events::id.eq(event_id))
                    .filter(events::payment_state.ne(PaymentState::Paid.to_string()))
                    .filter(events::lifecycle_state.eq(LifecycleState::Draft.to_string())),
            )
            .set((
                events::payment_state.eq(PaymentState::Paid.to_string()),
                events::lifecycle_state.eq(LifecycleState::Scheduled.to_string()),
                events::updated_at.eq(now),
            ))
            .execute(&mut conn)?;

            Ok(affected)
        })
        .await??)
    }

    async fn mark_paid(&self, event_id: Uuid, now: DateTime<Utc>) -> Result<usize> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<usize> {
            let mut conn = db_pool.get()?;

            let affected = update(
                events::table
                    .filter(events::id.eq(event_id))
                    .filter(events::payment_state.ne(PaymentState::Paid.to_string())),
            )
            .set((
                events::payment_state.eq(PaymentState::Paid.to_string()),
                events::updated_at.eq(now),
            ))
            .execute(&mut conn)?;

            Ok(affected)
        })
        .await??)
    }

    async fn mark_pending(&self, event_id: Uuid, now: DateTime<Utc>) -> Result<usize> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<usize> {
            let mut conn = db_pool.get()?;

            // PENDING is only reachable from NO_PAID; a paid event never
            // regresses to a checkout state.
            let affected = update(
                events::table
                    .filter(events::id.eq(event_id))
                    .filter(events::payment_state.eq(PaymentState::NoPaid.to_string())),
            )
            .set((
                events::payment_state.eq(PaymentState::Pending.to_string()),
                events::updated_at.eq(now),
            ))
            .execute(&mut conn)?;

            Ok(affected)
        })
        .await??)
    }

    async fn revert_to_draft(&self, event_id: Uuid, now: DateTime<Utc>) -> Result<usize> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<usize> {
            let mut conn = db_pool.get()?;

            // Payment reversion and lifecycle reset happen in one UPDATE so
            // the invariant can never be observed half-applied.
            let affected = update(
                events::table
                    .filter(events::id.eq(event_id))
                    .filter(events::payment_state.ne(PaymentState::NoPaid.to_string())),
            )
            .set((
                events::payment_state.eq(PaymentState::NoPaid.to_string()),
                events::lifecycle_state.eq(LifecycleState::Draft.to_string()),
                events::updated_at.eq(now),
            ))
            .execute(&mut conn)?;

            Ok(affected)
        })
        .await??)
    }

    async fn mark_scheduled(&self, event_id: Uuid, now: DateTime<Utc>) -> Result<usize> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<usize> {
            let mut conn = db_pool.get()?;

            let affected = update(
                events::table
                    .filter(events::id.eq(event_id))
                    .filter(events::payment_state.eq(PaymentState::Paid.to_string()))
                    .filter(events::lifecycle_state.eq(LifecycleState::Draft.to_string())),
            )
            .set((
                events::lifecycle_state.eq(LifecycleState::Scheduled.to_string()),
                events::updated_at.eq(now),
            ))
            .execute(&mut conn)?;

            Ok(affected)
        })
        .await??)
    }
}
