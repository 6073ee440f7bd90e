use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, prelude::*, update};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain::{
        entities::payment_orders::PaymentOrderEntity,
        repositories::payment_orders::PaymentOrderRepository,
        value_objects::enums::order_statuses::OrderStatus,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::payment_orders},
};

fn sweepable_statuses() -> [String; 2] {
    [
        OrderStatus::Pending.to_string(),
        OrderStatus::Processing.to_string(),
    ]
}

pub struct PaymentOrderPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaymentOrderPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PaymentOrderRepository for PaymentOrderPostgres {
    async fn list_lapsed_orders(&self, now: DateTime<Utc>) -> Result<Vec<PaymentOrderEntity>> {
        // Diesel is synchronous; run DB work on the blocking threadpool to
        // avoid stalling Tokio under load.
        let db_pool = Arc::clone(&self.db_pool);

        Ok(
            task::spawn_blocking(move || -> Result<Vec<PaymentOrderEntity>> {
                let mut conn = db_pool.get()?;

                let result = payment_orders::table
                    .select(PaymentOrderEntity::as_select())
                    .filter(payment_orders::status.eq_any(sweepable_statuses()))
                    .filter(payment_orders::expires_at.lt(now))
                    .order(payment_orders::expires_at.asc())
                    .load::<PaymentOrderEntity>(&mut conn)?;

                Ok(result)
            })
            .await??,
        )
    }

    async fn mark_expired(&self, order_id: Uuid) -> Result<usize> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<usize> {
            let mut conn = db_pool.get()?;

            // Same non-terminal guard as the selection predicate; a verified
            // order slips through as zero rows affected.
            let affected = update(
                payment_orders::table
                    .filter(payment_orders::id.eq(order_id))
                    .filter(payment_orders::status.eq_any(sweepable_statuses())),
            )
            .set(payment_orders::status.eq(OrderStatus::Expired.to_string()))
            .execute(&mut conn)?;

            Ok(affected)
        })
        .await??)
    }
}
