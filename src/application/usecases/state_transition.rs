use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::domain::{
    entities::audit_logs::NewAuditRecord,
    errors::LifecycleError,
    repositories::{audit_logs::AuditLogRepository, event_state::EventStateRepository},
    value_objects::enums::{
        audit_actions::AuditAction, lifecycle_states::LifecycleState, payment_states::PaymentState,
    },
};

/// Outcome of an idempotent transition request. `AlreadyApplied` covers both a
/// repeated call with the same target and a race lost to a concurrent caller;
/// neither is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateTransition {
    Applied,
    AlreadyApplied,
}

/// The single mutation entry point for payment/lifecycle state. Both the
/// periodic sweeps and the synchronous payment-verification path go through
/// here so the two code paths cannot drift apart.
pub struct StateTransitionUseCase {
    event_repo: Arc<dyn EventStateRepository + Send + Sync>,
    audit_repo: Arc<dyn AuditLogRepository + Send + Sync>,
}

impl StateTransitionUseCase {
    pub fn new(
        event_repo: Arc<dyn EventStateRepository + Send + Sync>,
        audit_repo: Arc<dyn AuditLogRepository + Send + Sync>,
    ) -> Self {
        Self {
            event_repo,
            audit_repo,
        }
    }

    pub async fn update_payment_state(
        &self,
        event_id: Uuid,
        target: PaymentState,
        now: DateTime<Utc>,
    ) -> Result<StateTransition> {
        let event = self
            .event_repo
            .find_by_id(event_id)
            .await?
            .ok_or(LifecycleError::EventNotFound(event_id))?;

        if event.payment_state == target.to_string() {
            debug!(%event_id, %target, "state_transition: payment state already at target");
            return Ok(StateTransition::AlreadyApplied);
        }

        let affected = match target {
            PaymentState::Paid => {
                // PAID while still a DRAFT with a date today-or-later goes
                // straight to SCHEDULED; anything else is left for the
                // lifecycle sweep.
                if event.lifecycle_state == LifecycleState::Draft.to_string()
                    && event.event_date >= now.date_naive()
                {
                    self.event_repo.mark_paid_and_scheduled(event_id, now).await?
                } else {
                    self.event_repo.mark_paid(event_id, now).await?
                }
            }
            PaymentState::Pending => self.event_repo.mark_pending(event_id, now).await?,
            PaymentState::NoPaid => self.event_repo.revert_to_draft(event_id, now).await?,
        };

        if affected == 0 {
            // A concurrent caller won the guarded UPDATE; their write stands.
            debug!(%event_id, %target, "state_transition: guard matched zero rows");
            return Ok(StateTransition::AlreadyApplied);
        }

        info!(
            %event_id,
            from = %event.payment_state,
            to = %target,
            "state_transition: payment state updated"
        );

        self.audit_repo
            .append(NewAuditRecord {
                event_id: Some(event_id),
                user_id: None,
                action: AuditAction::PaymentStateChanged,
                details: json!({
                    "from": event.payment_state,
                    "to": target.to_string(),
                }),
            })
            .await?;

        Ok(StateTransition::Applied)
    }

    /// Pushes a PAID draft to SCHEDULED. Refuses with a typed invariant
    /// violation for any non-PAID row; the row is left untouched.
    pub async fn schedule_event(
        &self,
        event_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<StateTransition> {
        let event = self
            .event_repo
            .find_by_id(event_id)
            .await?
            .ok_or(LifecycleError::EventNotFound(event_id))?;

        if event.payment_state != PaymentState::Paid.to_string() {
            error!(
                %event_id,
                payment_state = %event.payment_state,
                "state_transition: refusing to advance unpaid event past DRAFT"
            );
            return Err(LifecycleError::InvariantViolation {
                event_id,
                payment_state: event.payment_state,
            }
            .into());
        }

        if event.lifecycle_state != LifecycleState::Draft.to_string() {
            debug!(%event_id, lifecycle_state = %event.lifecycle_state, "state_transition: already past DRAFT");
            return Ok(StateTransition::AlreadyApplied);
        }

        let affected = self.event_repo.mark_scheduled(event_id, now).await?;
        if affected == 0 {
            return Ok(StateTransition::AlreadyApplied);
        }

        info!(%event_id, "state_transition: event scheduled");
        Ok(StateTransition::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::events::EventEntity;
    use crate::domain::repositories::{
        audit_logs::MockAuditLogRepository, event_state::MockEventStateRepository,
    };
    use chrono::{NaiveDate, NaiveTime, TimeZone};
    use mockall::predicate::eq;

    fn sample_event(
        id: Uuid,
        payment_state: PaymentState,
        lifecycle_state: LifecycleState,
        event_date: NaiveDate,
    ) -> EventEntity {
        let now = Utc::now();
        EventEntity {
            id,
            payment_state: payment_state.to_string(),
            lifecycle_state: lifecycle_state.to_string(),
            event_date,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            cooldown_until: None,
            disabled_at: None,
            archived_summary: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn test_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn paid_draft_with_future_date_becomes_scheduled() {
        let event_id = Uuid::new_v4();
        let now = test_now();
        let event = sample_event(
            event_id,
            PaymentState::Pending,
            LifecycleState::Draft,
            NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
        );

        let mut event_repo = MockEventStateRepository::new();
        let mut audit_repo = MockAuditLogRepository::new();

        event_repo
            .expect_find_by_id()
            .with(eq(event_id))
            .returning(move |_| {
                let event = event.clone();
                Box::pin(async move { Ok(Some(event)) })
            });
        event_repo
            .expect_mark_paid_and_scheduled()
            .with(eq(event_id), eq(now))
            .returning(|_, _| Box::pin(async move { Ok(1) }));
        audit_repo
            .expect_append()
            .withf(|record| record.action == AuditAction::PaymentStateChanged)
            .returning(|_| Box::pin(async move { Ok(1) }));

        let usecase = StateTransitionUseCase::new(Arc::new(event_repo), Arc::new(audit_repo));
        let outcome = usecase
            .update_payment_state(event_id, PaymentState::Paid, now)
            .await
            .unwrap();

        assert_eq!(outcome, StateTransition::Applied);
    }

    #[tokio::test]
    async fn paid_event_with_past_date_is_left_for_lifecycle_job() {
        let event_id = Uuid::new_v4();
        let now = test_now();
        let event = sample_event(
            event_id,
            PaymentState::Pending,
            LifecycleState::Draft,
            NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
        );

        let mut event_repo = MockEventStateRepository::new();
        let mut audit_repo = MockAuditLogRepository::new();

        event_repo.expect_find_by_id().returning(move |_| {
            let event = event.clone();
            Box::pin(async move { Ok(Some(event)) })
        });
        event_repo
            .expect_mark_paid()
            .with(eq(event_id), eq(now))
            .returning(|_, _| Box::pin(async move { Ok(1) }));
        event_repo.expect_mark_paid_and_scheduled().never();
        audit_repo
            .expect_append()
            .returning(|_| Box::pin(async move { Ok(1) }));

        let usecase = StateTransitionUseCase::new(Arc::new(event_repo), Arc::new(audit_repo));
        let outcome = usecase
            .update_payment_state(event_id, PaymentState::Paid, now)
            .await
            .unwrap();

        assert_eq!(outcome, StateTransition::Applied);
    }

    #[tokio::test]
    async fn repeated_target_is_already_applied_without_writes() {
        let event_id = Uuid::new_v4();
        let now = test_now();
        let event = sample_event(
            event_id,
            PaymentState::Paid,
            LifecycleState::Scheduled,
            NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
        );

        let mut event_repo = MockEventStateRepository::new();
        let audit_repo = MockAuditLogRepository::new();

        event_repo.expect_find_by_id().returning(move |_| {
            let event = event.clone();
            Box::pin(async move { Ok(Some(event)) })
        });
        event_repo.expect_mark_paid().never();
        event_repo.expect_mark_paid_and_scheduled().never();

        let usecase = StateTransitionUseCase::new(Arc::new(event_repo), Arc::new(audit_repo));
        let outcome = usecase
            .update_payment_state(event_id, PaymentState::Paid, now)
            .await
            .unwrap();

        assert_eq!(outcome, StateTransition::AlreadyApplied);
    }

    #[tokio::test]
    async fn race_loss_on_guarded_update_is_success() {
        let event_id = Uuid::new_v4();
        let now = test_now();
        let event = sample_event(
            event_id,
            PaymentState::Pending,
            LifecycleState::Draft,
            NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
        );

        let mut event_repo = MockEventStateRepository::new();
        let audit_repo = MockAuditLogRepository::new();

        event_repo.expect_find_by_id().returning(move |_| {
            let event = event.clone();
            Box::pin(async move { Ok(Some(event)) })
        });
        event_repo
            .expect_mark_paid_and_scheduled()
            .returning(|_, _| Box::pin(async move { Ok(0) }));

        let usecase = StateTransitionUseCase::new(Arc::new(event_repo), Arc::new(audit_repo));
        let outcome = usecase
            .update_payment_state(event_id, PaymentState::Paid, now)
            .await
            .unwrap();

        assert_eq!(outcome, StateTransition::AlreadyApplied);
    }

    #[tokio::test]
    async fn revert_to_no_paid_uses_single_combined_write() {
        let event_id = Uuid::new_v4();
        let now = test_now();
        let event = sample_event(
            event_id,
            PaymentState::Pending,
            LifecycleState::Draft,
            NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
        );

        let mut event_repo = MockEventStateRepository::new();
        let mut audit_repo = MockAuditLogRepository::new();

        event_repo.expect_find_by_id().returning(move |_| {
            let event = event.clone();
            Box::pin(async move { Ok(Some(event)) })
        });
        event_repo
            .expect_revert_to_draft()
            .with(eq(event_id), eq(now))
            .returning(|_, _| Box::pin(async move { Ok(1) }));
        audit_repo
            .expect_append()
            .returning(|_| Box::pin(async move { Ok(1) }));

        let usecase = StateTransitionUseCase::new(Arc::new(event_repo), Arc::new(audit_repo));
        let outcome = usecase
            .update_payment_state(event_id, PaymentState::NoPaid, now)
            .await
            .unwrap();

        assert_eq!(outcome, StateTransition::Applied);
    }

    #[tokio::test]
    async fn scheduling_an_unpaid_event_is_an_invariant_violation() {
        let event_id = Uuid::new_v4();
        let now = test_now();
        let event = sample_event(
            event_id,
            PaymentState::Pending,
            LifecycleState::Draft,
            NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
        );

        let mut event_repo = MockEventStateRepository::new();
        let audit_repo = MockAuditLogRepository::new();

        event_repo.expect_find_by_id().returning(move |_| {
            let event = event.clone();
            Box::pin(async move { Ok(Some(event)) })
        });
        event_repo.expect_mark_scheduled().never();

        let usecase = StateTransitionUseCase::new(Arc::new(event_repo), Arc::new(audit_repo));
        let error = usecase.schedule_event(event_id, now).await.unwrap_err();

        let violation = error.downcast_ref::<LifecycleError>();
        assert!(matches!(
            violation,
            Some(LifecycleError::InvariantViolation { .. })
        ));
    }
}
