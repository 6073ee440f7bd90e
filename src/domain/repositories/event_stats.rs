use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::value_objects::event_stats::EventStats;

#[async_trait]
#[automock]
pub trait EventStatsRepository {
    /// Tallies guest, RSVP, check-in, message and view counts for one event.
    /// Read-only: archival never writes to the child tables.
    async fn aggregate(&self, event_id: Uuid) -> Result<EventStats>;
}
