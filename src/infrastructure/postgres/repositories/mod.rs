pub mod account_flags;
pub mod audit_logs;
pub mod event_lifecycle;
pub mod event_state;
pub mod event_stats;
pub mod payment_orders;
