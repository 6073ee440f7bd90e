use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::domain::{
    entities::{
        account_flags::AccountFlagEntity, audit_logs::NewAuditRecord,
        payment_orders::PaymentOrderEntity,
    },
    repositories::{
        account_flags::AccountFlagRepository, audit_logs::AuditLogRepository,
        payment_orders::PaymentOrderRepository,
    },
    value_objects::enums::{audit_actions::AuditAction, payment_states::PaymentState},
};

use super::state_transition::StateTransitionUseCase;

/// A user is flagged after 3 expired orders, or once more than half of at
/// least 5 attempts have expired.
const FLAG_EXPIRED_COUNT_THRESHOLD: i32 = 3;
const FLAG_MIN_TOTAL_ATTEMPTS: i32 = 5;
const FLAG_EXPIRED_RATIO: f64 = 0.5;

#[derive(Debug, Clone, Default)]
pub struct PaymentExpirationResult {
    pub scanned: usize,
    pub expired: usize,
    pub skipped_race_lost: usize,
    pub row_failures: usize,
    pub users_flagged: usize,
    pub hourly_counters_reset: usize,
    pub expired_ids: Vec<Uuid>,
}

/// The 5-minute sweep reverting lapsed checkout attempts. Each order is
/// processed independently so one bad row never aborts the run.
pub struct PaymentExpirationUseCase {
    order_repo: Arc<dyn PaymentOrderRepository + Send + Sync>,
    flag_repo: Arc<dyn AccountFlagRepository + Send + Sync>,
    audit_repo: Arc<dyn AuditLogRepository + Send + Sync>,
    state_transition: Arc<StateTransitionUseCase>,
}

impl PaymentExpirationUseCase {
    pub fn new(
        order_repo: Arc<dyn PaymentOrderRepository + Send + Sync>,
        flag_repo: Arc<dyn AccountFlagRepository + Send + Sync>,
        audit_repo: Arc<dyn AuditLogRepository + Send + Sync>,
        state_transition: Arc<StateTransitionUseCase>,
    ) -> Self {
        Self {
            order_repo,
            flag_repo,
            audit_repo,
            state_transition,
        }
    }

    pub async fn run(&self, now: DateTime<Utc>) -> Result<PaymentExpirationResult> {
        let orders = self.order_repo.list_lapsed_orders(now).await?;

        let mut result = PaymentExpirationResult {
            scanned: orders.len(),
            ..Default::default()
        };
        let mut affected_users: HashMap<Uuid, AccountFlagEntity> = HashMap::new();

        for order in orders {
            match self.expire_order(&order, now).await {
                Ok(Some(flags)) => {
                    result.expired += 1;
                    if result.expired_ids.len() < 20 {
                        result.expired_ids.push(order.id);
                    }
                    affected_users.insert(order.user_id, flags);
                }
                Ok(None) => result.skipped_race_lost += 1,
                Err(err) => {
                    error!(
                        order_id = %order.id,
                        order_ref = %order.order_ref,
                        error = ?err,
                        "payment_expiration: failed to expire order; skipping"
                    );
                    result.row_failures += 1;
                }
            }
        }

        for (user_id, flags) in &affected_users {
            match self.evaluate_abuse_thresholds(*user_id, flags, now).await {
                Ok(true) => result.users_flagged += 1,
                Ok(false) => {}
                Err(err) => {
                    error!(
                        %user_id,
                        error = ?err,
                        "payment_expiration: failed to evaluate abuse thresholds; skipping"
                    );
                    result.row_failures += 1;
                }
            }
        }

        let cutoff = now - Duration::hours(1);
        result.hourly_counters_reset = self
            .flag_repo
            .reset_stale_hourly_counters(cutoff, now)
            .await?;

        info!(
            scanned = result.scanned,
            expired = result.expired,
            skipped_race_lost = result.skipped_race_lost,
            row_failures = result.row_failures,
            users_flagged = result.users_flagged,
            hourly_counters_reset = result.hourly_counters_reset,
            "payment_expiration: sweep completed"
        );

        Ok(result)
    }

    /// Returns the user's flag row after the increment, or `None` when the
    /// guarded update matched zero rows (the verifier won the race).
    async fn expire_order(
        &self,
        order: &PaymentOrderEntity,
        now: DateTime<Utc>,
    ) -> Result<Option<AccountFlagEntity>> {
        let affected = self.order_repo.mark_expired(order.id).await?;
        if affected == 0 {
            debug!(
                order_id = %order.id,
                order_ref = %order.order_ref,
                "payment_expiration: order already terminal; skipping"
            );
            return Ok(None);
        }

        if let Some(event_id) = order.event_id {
            // Reverts lifecycle to DRAFT in the same write.
            self.state_transition
                .update_payment_state(event_id, PaymentState::NoPaid, now)
                .await?;
        }

        self.audit_repo
            .append(NewAuditRecord {
                event_id: order.event_id,
                user_id: Some(order.user_id),
                action: AuditAction::PaymentExpired,
                details: json!({
                    "order_ref": order.order_ref,
                    "amount_minor": order.amount_minor,
                    "created_at": order.created_at,
                    "expires_at": order.expires_at,
                }),
            })
            .await?;

        let flags = self
            .flag_repo
            .record_expired_attempt(order.user_id, now)
            .await?;

        Ok(Some(flags))
    }

    /// Flips `is_flagged` at most once per user and appends one audit record
    /// on the actual flip.
    async fn evaluate_abuse_thresholds(
        &self,
        user_id: Uuid,
        flags: &AccountFlagEntity,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        if flags.is_flagged || !exceeds_abuse_thresholds(flags) {
            return Ok(false);
        }

        let affected = self.flag_repo.mark_flagged(user_id, now).await?;
        if affected == 0 {
            // Another sweep flipped it first; the flag is write-once.
            return Ok(false);
        }

        info!(
            %user_id,
            expired_payment_count = flags.expired_payment_count,
            total_payment_attempts = flags.total_payment_attempts,
            "payment_expiration: user flagged for payment abandonment"
        );

        self.audit_repo
            .append(NewAuditRecord {
                event_id: None,
                user_id: Some(user_id),
                action: AuditAction::UserFlagged,
                details: json!({
                    "expired_payment_count": flags.expired_payment_count,
                    "total_payment_attempts": flags.total_payment_attempts,
                }),
            })
            .await?;

        Ok(true)
    }
}

fn exceeds_abuse_thresholds(flags: &AccountFlagEntity) -> bool {
    if flags.expired_payment_count >= FLAG_EXPIRED_COUNT_THRESHOLD {
        return true;
    }

    flags.total_payment_attempts >= FLAG_MIN_TOTAL_ATTEMPTS
        && f64::from(flags.expired_payment_count) / f64::from(flags.total_payment_attempts)
            > FLAG_EXPIRED_RATIO
}
