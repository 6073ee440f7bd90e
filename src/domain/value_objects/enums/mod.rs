pub mod audit_actions;
pub mod lifecycle_states;
pub mod order_statuses;
pub mod payment_states;
