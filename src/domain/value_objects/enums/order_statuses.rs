use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Verified,
    Expired,
    Failed,
}

impl OrderStatus {
    /// Terminal statuses never transition again; the expiration sweep only
    /// touches non-terminal orders.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Verified | OrderStatus::Expired | OrderStatus::Failed
        )
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let order_status = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Verified => "verified",
            OrderStatus::Expired => "expired",
            OrderStatus::Failed => "failed",
        };
        write!(f, "{}", order_status)
    }
}
