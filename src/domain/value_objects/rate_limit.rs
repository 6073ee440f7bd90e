use uuid::Uuid;

/// Counter key for one rate-limit dimension. Keys of different dimensions
/// never share a window even when their string forms collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RateLimitKey {
    ClientAddr(String),
    Event(Uuid),
    Phone(String),
}

/// Fixed-window policy: at most `max_requests` hits per `window_ms` window.
/// The window is fixed, not sliding; bursts at window boundaries are an
/// accepted trade-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window_ms: i64,
}

/// Keeps digits only so formatting variants of the same phone number share one
/// counter window.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}
