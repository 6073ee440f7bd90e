use std::collections::BTreeMap;

/// Aggregated child-data tally for one event, computed at archival time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventStats {
    pub guest_count: i64,
    pub total_party_size: i64,
    pub rsvp_counts: BTreeMap<String, i64>,
    pub checkin_count: i64,
    pub message_count: i64,
    pub view_count: i64,
}
