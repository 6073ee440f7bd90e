use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::payment_orders;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = payment_orders)]
pub struct PaymentOrderEntity {
    pub id: Uuid,
    pub event_id: Option<Uuid>,
    pub user_id: Uuid,
    pub order_ref: String,
    pub status: String,
    pub amount_minor: i32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
