use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain::{
        entities::account_flags::{AccountFlagEntity, InsertAccountFlagEntity},
        repositories::account_flags::AccountFlagRepository,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::account_flags},
};

pub struct AccountFlagPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl AccountFlagPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl AccountFlagRepository for AccountFlagPostgres {
    async fn record_expired_attempt(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<AccountFlagEntity> {
        // Diesel is synchronous; run DB work on the blocking threadpool to
        // avoid stalling Tokio under load.
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<AccountFlagEntity> {
            let mut conn = db_pool.get()?;

            let new_flag = InsertAccountFlagEntity {
                user_id,
                expired_payment_count: 1,
                total_payment_attempts: 1,
                is_flagged: false,
                events_created_last_hour: 0,
                is_rate_limited: false,
                last_event_created_at: None,
                updated_at: now,
            };

            let flag = insert_into(account_flags::table)
                .values(&new_flag)
                .on_conflict(account_flags::user_id)
                .do_update()
                .set((
                    account_flags::expired_payment_count
                        .eq(account_flags::expired_payment_count + 1),
                    account_flags::total_payment_attempts
                        .eq(account_flags::total_payment_attempts + 1),
                    account_flags::updated_at.eq(now),
                ))
                .returning(AccountFlagEntity::as_returning())
                .get_result::<AccountFlagEntity>(&mut conn)?;

            Ok(flag)
        })
        .await??)
    }

    async fn mark_flagged(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<usize> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<usize> {
            let mut conn = db_pool.get()?;

            // Write-once: the guard makes a second flip a zero-row no-op.
            let affected = update(
                account_flags::table
                    .filter(account_flags::user_id.eq(user_id))
                    .filter(account_flags::is_flagged.eq(false)),
            )
            .set((
                account_flags::is_flagged.eq(true),
                account_flags::updated_at.eq(now),
            ))
            .execute(&mut conn)?;

            Ok(affected)
        })
        .await??)
    }

    async fn reset_stale_hourly_counters(
        &self,
        cutoff: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<usize> {
            let mut conn = db_pool.get()?;

            let affected = update(
                account_flags::table
                    .filter(account_flags::last_event_created_at.lt(cutoff))
                    .filter(
                        account_flags::events_created_last_hour
                            .gt(0)
                            .or(account_flags::is_rate_limited.eq(true)),
                    ),
            )
            .set((
                account_flags::events_created_last_hour.eq(0),
                account_flags::is_rate_limited.eq(false),
                account_flags::updated_at.eq(now),
            ))
            .execute(&mut conn)?;

            Ok(affected)
        })
        .await??)
    }
}
