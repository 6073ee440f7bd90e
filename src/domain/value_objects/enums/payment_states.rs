use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentState {
    #[default]
    NoPaid,
    Pending,
    Paid,
}

impl Display for PaymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let payment_state = match self {
            PaymentState::NoPaid => "NO_PAID",
            PaymentState::Pending => "PENDING",
            PaymentState::Paid => "PAID",
        };
        write!(f, "{}", payment_state)
    }
}
