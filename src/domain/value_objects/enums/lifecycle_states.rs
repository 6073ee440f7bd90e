use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Position of an event in its operational timeline. Events never go backwards
/// except for the money-gated reset to `Draft` when payment is reverted.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LifecycleState {
    #[default]
    Draft,
    Scheduled,
    Live,
    Ended,
    Cooling,
    Disabled,
}

impl Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lifecycle_state = match self {
            LifecycleState::Draft => "DRAFT",
            LifecycleState::Scheduled => "SCHEDULED",
            LifecycleState::Live => "LIVE",
            LifecycleState::Ended => "ENDED",
            LifecycleState::Cooling => "COOLING",
            LifecycleState::Disabled => "DISABLED",
        };
        write!(f, "{}", lifecycle_state)
    }
}
