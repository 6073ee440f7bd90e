use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::account_flags;

/// One row per user tracking payment-abandonment behavior. Created lazily on
/// the first expired order.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = account_flags)]
#[diesel(primary_key(user_id))]
pub struct AccountFlagEntity {
    pub user_id: Uuid,
    pub expired_payment_count: i32,
    pub total_payment_attempts: i32,
    pub is_flagged: bool,
    pub events_created_last_hour: i32,
    pub is_rate_limited: bool,
    pub last_event_created_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = account_flags)]
pub struct InsertAccountFlagEntity {
    pub user_id: Uuid,
    pub expired_payment_count: i32,
    pub total_payment_attempts: i32,
    pub is_flagged: bool,
    pub events_created_last_hour: i32,
    pub is_rate_limited: bool,
    pub last_event_created_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}
