use anyhow::Result;
use async_trait::async_trait;
use diesel::dsl::{count_star, sum};
use diesel::{RunQueryDsl, prelude::*};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain::{
        repositories::event_stats::EventStatsRepository, value_objects::event_stats::EventStats,
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{event_views, guest_messages, guests},
    },
};

pub struct EventStatsPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl EventStatsPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl EventStatsRepository for EventStatsPostgres {
    async fn aggregate(&self, event_id: Uuid) -> Result<EventStats> {
        // Diesel is synchronous; run DB work on the blocking threadpool to
        // avoid stalling Tokio under load.
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<EventStats> {
            let mut conn = db_pool.get()?;

            let guest_count: i64 = guests::table
                .filter(guests::event_id.eq(event_id))
                .count()
                .get_result(&mut conn)?;

            let total_party_size: Option<i64> = guests::table
                .filter(guests::event_id.eq(event_id))
                .select(sum(guests::party_size))
                .get_result(&mut conn)?;

            let rsvp_rows: Vec<(Option<String>, i64)> = guests::table
                .filter(guests::event_id.eq(event_id))
                .filter(guests::rsvp_response.is_not_null())
                .group_by(guests::rsvp_response)
                .select((guests::rsvp_response, count_star()))
                .load(&mut conn)?;

            let rsvp_counts: BTreeMap<String, i64> = rsvp_rows
                .into_iter()
                .filter_map(|(response, count)| response.map(|response| (response, count)))
                .collect();

            let checkin_count: i64 = guests::table
                .filter(guests::event_id.eq(event_id))
                .filter(guests::checked_in_at.is_not_null())
                .count()
                .get_result(&mut conn)?;

            let message_count: i64 = guest_messages::table
                .filter(guest_messages::event_id.eq(event_id))
                .count()
                .get_result(&mut conn)?;

            let view_count: i64 = event_views::table
                .filter(event_views::event_id.eq(event_id))
                .count()
                .get_result(&mut conn)?;

            Ok(EventStats {
                guest_count,
                total_party_size: total_party_size.unwrap_or(0),
                rsvp_counts,
                checkin_count,
                message_count,
                view_count,
            })
        })
        .await??)
    }
}
