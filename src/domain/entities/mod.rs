pub mod account_flags;
pub mod audit_logs;
pub mod events;
pub mod payment_orders;
