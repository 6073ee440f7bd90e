use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::event_stats::EventStats;

/// Final statistics persisted into `events.archived_summary` before an event
/// becomes permanently disabled. Versioned so historical audit records stay
/// interpretable as the schema evolves. Stored as JSONB in the database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "version")]
pub enum ArchivedSummary {
    #[serde(rename = "v1")]
    V1(ArchivedSummaryV1),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArchivedSummaryV1 {
    pub guest_count: i64,
    pub total_party_size: i64,
    pub rsvp_counts: BTreeMap<String, i64>,
    pub checkin_count: i64,
    pub message_count: i64,
    pub view_count: i64,
    pub archived_at: DateTime<Utc>,
}

impl ArchivedSummary {
    pub fn from_stats(stats: EventStats, archived_at: DateTime<Utc>) -> Self {
        ArchivedSummary::V1(ArchivedSummaryV1 {
            guest_count: stats.guest_count,
            total_party_size: stats.total_party_size,
            rsvp_counts: stats.rsvp_counts,
            checkin_count: stats.checkin_count,
            message_count: stats.message_count,
            view_count: stats.view_count,
            archived_at,
        })
    }
}
