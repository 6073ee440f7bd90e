use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{
    repositories::rate_limit::RateLimitStore,
    value_objects::rate_limit::{RateLimitKey, RateLimitPolicy, normalize_phone},
};

/// Per-dimension fixed-window policies for the spam-prone guest endpoints.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitPolicies {
    pub client_addr: RateLimitPolicy,
    pub event: RateLimitPolicy,
    pub phone: RateLimitPolicy,
}

/// What a guarded endpoint should do with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited { key: RateLimitKey },
}

/// The dimensions one request is counted under. Absent dimensions are simply
/// not checked (e.g. an RSVP form without a phone field).
#[derive(Debug, Clone, Default)]
pub struct RateLimitRequest {
    pub client_addr: Option<String>,
    pub event_id: Option<Uuid>,
    pub phone: Option<String>,
}

/// Abuse-aware limiter: a request passes only when every applicable key is
/// under its own limit. Counters live behind [`RateLimitStore`], so a
/// multi-process deployment can externalize them without touching callers.
pub struct RateLimitUseCase {
    store: Arc<dyn RateLimitStore + Send + Sync>,
    policies: RateLimitPolicies,
}

impl RateLimitUseCase {
    pub fn new(store: Arc<dyn RateLimitStore + Send + Sync>, policies: RateLimitPolicies) -> Self {
        Self { store, policies }
    }

    pub async fn check_request(
        &self,
        request: &RateLimitRequest,
        now: DateTime<Utc>,
    ) -> Result<RateLimitDecision> {
        let mut keyed_policies: Vec<(RateLimitKey, RateLimitPolicy)> = Vec::new();

        if let Some(client_addr) = &request.client_addr {
            keyed_policies.push((
                RateLimitKey::ClientAddr(client_addr.clone()),
                self.policies.client_addr,
            ));
        }
        if let Some(event_id) = request.event_id {
            keyed_policies.push((RateLimitKey::Event(event_id), self.policies.event));
        }
        if let Some(phone) = &request.phone {
            keyed_policies.push((
                RateLimitKey::Phone(normalize_phone(phone)),
                self.policies.phone,
            ));
        }

        for (key, policy) in keyed_policies {
            let under_limit = self
                .store
                .increment_and_check(key.clone(), policy, now)
                .await?;
            if !under_limit {
                debug!(?key, "rate_limit: request rejected");
                return Ok(RateLimitDecision::Limited { key });
            }
        }

        Ok(RateLimitDecision::Allowed)
    }
}
