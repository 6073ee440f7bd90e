pub mod archived_summary;
pub mod enums;
pub mod event_stats;
pub mod rate_limit;
