use uuid::Uuid;

/// Typed violations that must never be "fixed" silently; callers log them at
/// high severity and leave the row untouched.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error(
        "event {event_id} has payment_state {payment_state}; lifecycle may not advance past DRAFT"
    )]
    InvariantViolation {
        event_id: Uuid,
        payment_state: String,
    },

    #[error("event {0} not found")]
    EventNotFound(Uuid),
}
