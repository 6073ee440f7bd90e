use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuditAction {
    PaymentExpired,
    PaymentStateChanged,
    EventsStarted,
    EventsEnded,
    EventDisabled,
    UserFlagged,
}

impl Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let audit_action = match self {
            AuditAction::PaymentExpired => "PAYMENT_EXPIRED",
            AuditAction::PaymentStateChanged => "PAYMENT_STATE_CHANGED",
            AuditAction::EventsStarted => "EVENTS_STARTED",
            AuditAction::EventsEnded => "EVENTS_ENDED",
            AuditAction::EventDisabled => "EVENT_DISABLED",
            AuditAction::UserFlagged => "USER_FLAGGED",
        };
        write!(f, "{}", audit_action)
    }
}
