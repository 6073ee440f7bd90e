use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::{
    entities::{audit_logs::NewAuditRecord, events::EventEntity},
    repositories::{audit_logs::AuditLogRepository, event_lifecycle::EventLifecycleRepository},
    value_objects::enums::audit_actions::AuditAction,
};

use super::archival::ArchivalUseCase;

/// Fixed retention window between an event ending and becoming archivable.
const COOLDOWN_DAYS: i64 = 14;

#[derive(Debug, Clone, Default)]
pub struct LifecycleTransitionResult {
    pub started: usize,
    pub ended: usize,
    pub disabled: usize,
    pub row_failures: usize,
    pub phase_failures: usize,
    pub started_ids: Vec<Uuid>,
    pub ended_ids: Vec<Uuid>,
    pub disabled_ids: Vec<Uuid>,
}

/// The hourly sweep advancing paid events through their timeline. One "now"
/// snapshot covers the whole run; the three phases commit independently so a
/// failing phase never blocks the others.
pub struct LifecycleTransitionUseCase {
    event_repo: Arc<dyn EventLifecycleRepository + Send + Sync>,
    audit_repo: Arc<dyn AuditLogRepository + Send + Sync>,
    archival: Arc<ArchivalUseCase>,
}

impl LifecycleTransitionUseCase {
    pub fn new(
        event_repo: Arc<dyn EventLifecycleRepository + Send + Sync>,
        audit_repo: Arc<dyn AuditLogRepository + Send + Sync>,
        archival: Arc<ArchivalUseCase>,
    ) -> Self {
        Self {
            event_repo,
            audit_repo,
            archival,
        }
    }

    pub async fn run(&self, now: DateTime<Utc>) -> Result<LifecycleTransitionResult> {
        let mut result = LifecycleTransitionResult::default();

        if let Err(err) = self.start_due_events(now, &mut result).await {
            error!(error = ?err, "lifecycle_transition: SCHEDULED->LIVE phase failed");
            result.phase_failures += 1;
        }

        if let Err(err) = self.end_finished_events(now, &mut result).await {
            error!(error = ?err, "lifecycle_transition: LIVE->ENDED phase failed");
            result.phase_failures += 1;
        }

        if let Err(err) = self.disable_cooled_events(now, &mut result).await {
            error!(error = ?err, "lifecycle_transition: ENDED->DISABLED phase failed");
            result.phase_failures += 1;
        }

        info!(
            started = result.started,
            ended = result.ended,
            disabled = result.disabled,
            row_failures = result.row_failures,
            phase_failures = result.phase_failures,
            "lifecycle_transition: sweep completed"
        );

        Ok(result)
    }

    /// Phase a: SCHEDULED→LIVE. The start comparison is inclusive; an event is
    /// LIVE at its exact start instant.
    async fn start_due_events(
        &self,
        now: DateTime<Utc>,
        result: &mut LifecycleTransitionResult,
    ) -> Result<()> {
        let candidates = self.event_repo.list_due_scheduled(now.date_naive()).await?;
        let due_ids: Vec<Uuid> = candidates
            .iter()
            .filter(|event| event.starts_at() <= now)
            .map(|event| event.id)
            .collect();

        if due_ids.is_empty() {
            return Ok(());
        }

        let started = self.event_repo.mark_live(due_ids.clone(), now).await?;
        result.started = started;
        result.started_ids = due_ids.clone();

        self.audit_repo
            .append(NewAuditRecord {
                event_id: None,
                user_id: None,
                action: AuditAction::EventsStarted,
                details: json!({
                    "event_ids": due_ids,
                    "count": started,
                }),
            })
            .await?;

        Ok(())
    }

    /// Phase b: LIVE→ENDED. The end comparison is exclusive; an event is still
    /// LIVE at its exact end instant. `cooldown_until` is set here exactly
    /// once and never recomputed.
    async fn end_finished_events(
        &self,
        now: DateTime<Utc>,
        result: &mut LifecycleTransitionResult,
    ) -> Result<()> {
        let candidates = self.event_repo.list_live(now.date_naive()).await?;
        let finished: Vec<&EventEntity> = candidates
            .iter()
            .filter(|event| event.ends_at() < now)
            .collect();

        if finished.is_empty() {
            return Ok(());
        }

        let mut ended_ids = Vec::new();
        for event in finished {
            let cooldown_until = event.ends_at() + Duration::days(COOLDOWN_DAYS);
            let affected = self
                .event_repo
                .mark_ended(event.id, cooldown_until, now)
                .await?;
            if affected > 0 {
                ended_ids.push(event.id);
            }
        }

        result.ended = ended_ids.len();
        result.ended_ids = ended_ids.clone();

        if !ended_ids.is_empty() {
            self.audit_repo
                .append(NewAuditRecord {
                    event_id: None,
                    user_id: None,
                    action: AuditAction::EventsEnded,
                    details: json!({
                        "event_ids": ended_ids,
                        "count": ended_ids.len(),
                    }),
                })
                .await?;
        }

        Ok(())
    }

    /// Phase c: ENDED/COOLING→DISABLED, archiving first. Rows are processed
    /// individually; a failed row stays eligible for the next run because its
    /// selection predicate still matches.
    async fn disable_cooled_events(
        &self,
        now: DateTime<Utc>,
        result: &mut LifecycleTransitionResult,
    ) -> Result<()> {
        let events = self.event_repo.list_cooldown_elapsed(now).await?;

        for event in events {
            match self.disable_one(&event, now).await {
                Ok(()) => {
                    result.disabled += 1;
                    if result.disabled_ids.len() < 20 {
                        result.disabled_ids.push(event.id);
                    }
                }
                Err(err) => {
                    error!(
                        event_id = %event.id,
                        error = ?err,
                        "lifecycle_transition: failed to disable event; skipping"
                    );
                    result.row_failures += 1;
                }
            }
        }

        Ok(())
    }

    async fn disable_one(&self, event: &EventEntity, now: DateTime<Utc>) -> Result<()> {
        // Archive before the terminal transition so the summary exists by the
        // time the event reads as DISABLED.
        self.archival.archive_event(event.id, now).await?;
        self.event_repo.mark_disabled(event.id, now).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{
        audit_logs::MockAuditLogRepository, event_lifecycle::MockEventLifecycleRepository,
        event_stats::MockEventStatsRepository,
    };
    use crate::domain::value_objects::enums::{
        lifecycle_states::LifecycleState, payment_states::PaymentState,
    };
    use crate::domain::value_objects::event_stats::EventStats;
    use chrono::{NaiveDate, NaiveTime, TimeZone};
    use mockall::predicate::eq;

    fn sample_event(
        lifecycle_state: LifecycleState,
        event_date: NaiveDate,
        start: (u32, u32),
        end: (u32, u32),
    ) -> EventEntity {
        let now = Utc::now();
        EventEntity {
            id: Uuid::new_v4(),
            payment_state: PaymentState::Paid.to_string(),
            lifecycle_state: lifecycle_state.to_string(),
            event_date,
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            cooldown_until: None,
            disabled_at: None,
            archived_summary: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn archival_with_defaults() -> Arc<ArchivalUseCase> {
        let mut stats_repo = MockEventStatsRepository::new();
        let mut event_repo = MockEventLifecycleRepository::new();
        let mut audit_repo = MockAuditLogRepository::new();

        stats_repo
            .expect_aggregate()
            .returning(|_| Box::pin(async move { Ok(EventStats::default()) }));
        event_repo
            .expect_store_archived_summary()
            .returning(|_, _, _| Box::pin(async move { Ok(1) }));
        audit_repo
            .expect_append()
            .returning(|_| Box::pin(async move { Ok(1) }));

        Arc::new(ArchivalUseCase::new(
            Arc::new(stats_repo),
            Arc::new(event_repo),
            Arc::new(audit_repo),
        ))
    }

    fn empty_phases(repo: &mut MockEventLifecycleRepository, skip: &str) {
        if skip != "scheduled" {
            repo.expect_list_due_scheduled()
                .returning(|_| Box::pin(async move { Ok(vec![]) }));
        }
        if skip != "live" {
            repo.expect_list_live()
                .returning(|_| Box::pin(async move { Ok(vec![]) }));
        }
        if skip != "cooldown" {
            repo.expect_list_cooldown_elapsed()
                .returning(|_| Box::pin(async move { Ok(vec![]) }));
        }
    }

    #[tokio::test]
    async fn scheduled_event_goes_live_at_or_after_start_instant() {
        // Event starts 09:00; the sweep runs 09:01 the same day.
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 9, 1, 0).unwrap();
        let event = sample_event(
            LifecycleState::Scheduled,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            (9, 0),
            (17, 0),
        );
        let event_id = event.id;

        let mut event_repo = MockEventLifecycleRepository::new();
        let mut audit_repo = MockAuditLogRepository::new();

        event_repo
            .expect_list_due_scheduled()
            .with(eq(now.date_naive()))
            .returning(move |_| {
                let events = vec![event.clone()];
                Box::pin(async move { Ok(events) })
            });
        event_repo
            .expect_mark_live()
            .with(eq(vec![event_id]), eq(now))
            .times(1)
            .returning(|ids, _| {
                let count = ids.len();
                Box::pin(async move { Ok(count) })
            });
        audit_repo
            .expect_append()
            .withf(|record| record.action == AuditAction::EventsStarted)
            .times(1)
            .returning(|_| Box::pin(async move { Ok(1) }));
        empty_phases(&mut event_repo, "scheduled");

        let usecase = LifecycleTransitionUseCase::new(
            Arc::new(event_repo),
            Arc::new(audit_repo),
            archival_with_defaults(),
        );

        let result = usecase.run(now).await.unwrap();
        assert_eq!(result.started, 1);
        assert_eq!(result.started_ids, vec![event_id]);
    }

    #[tokio::test]
    async fn start_is_inclusive_and_end_is_exclusive_at_the_exact_instant() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        // Starts exactly now: due. A LIVE event ending exactly now: not ended.
        let starting = sample_event(
            LifecycleState::Scheduled,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            (9, 0),
            (17, 0),
        );
        let ending = sample_event(
            LifecycleState::Live,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            (8, 0),
            (9, 0),
        );
        let starting_id = starting.id;

        let mut event_repo = MockEventLifecycleRepository::new();
        let mut audit_repo = MockAuditLogRepository::new();

        event_repo.expect_list_due_scheduled().returning(move |_| {
            let events = vec![starting.clone()];
            Box::pin(async move { Ok(events) })
        });
        event_repo
            .expect_mark_live()
            .with(eq(vec![starting_id]), eq(now))
            .times(1)
            .returning(|_, _| Box::pin(async move { Ok(1) }));
        event_repo.expect_list_live().returning(move |_| {
            let events = vec![ending.clone()];
            Box::pin(async move { Ok(events) })
        });
        event_repo.expect_mark_ended().never();
        event_repo
            .expect_list_cooldown_elapsed()
            .returning(|_| Box::pin(async move { Ok(vec![]) }));
        audit_repo
            .expect_append()
            .withf(|record| record.action == AuditAction::EventsStarted)
            .times(1)
            .returning(|_| Box::pin(async move { Ok(1) }));

        let usecase = LifecycleTransitionUseCase::new(
            Arc::new(event_repo),
            Arc::new(audit_repo),
            archival_with_defaults(),
        );

        let result = usecase.run(now).await.unwrap();
        assert_eq!(result.started, 1);
        assert_eq!(result.ended, 0);
    }

    #[tokio::test]
    async fn finished_event_gets_cooldown_of_end_plus_fourteen_days() {
        // Ends 17:00 on 2025-01-01; the sweep runs 17:01.
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 17, 1, 0).unwrap();
        let event = sample_event(
            LifecycleState::Live,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            (9, 0),
            (17, 0),
        );
        let event_id = event.id;
        let expected_cooldown = Utc.with_ymd_and_hms(2025, 1, 15, 17, 0, 0).unwrap();

        let mut event_repo = MockEventLifecycleRepository::new();
        let mut audit_repo = MockAuditLogRepository::new();

        event_repo.expect_list_live().returning(move |_| {
            let events = vec![event.clone()];
            Box::pin(async move { Ok(events) })
        });
        event_repo
            .expect_mark_ended()
            .with(eq(event_id), eq(expected_cooldown), eq(now))
            .times(1)
            .returning(|_, _, _| Box::pin(async move { Ok(1) }));
        audit_repo
            .expect_append()
            .withf(|record| record.action == AuditAction::EventsEnded)
            .times(1)
            .returning(|_| Box::pin(async move { Ok(1) }));
        empty_phases(&mut event_repo, "live");

        let usecase = LifecycleTransitionUseCase::new(
            Arc::new(event_repo),
            Arc::new(audit_repo),
            archival_with_defaults(),
        );

        let result = usecase.run(now).await.unwrap();
        assert_eq!(result.ended, 1);
        assert_eq!(result.ended_ids, vec![event_id]);
    }

    #[tokio::test]
    async fn cooled_down_event_is_archived_then_disabled() {
        let now = Utc.with_ymd_and_hms(2025, 1, 16, 0, 0, 0).unwrap();
        let mut event = sample_event(
            LifecycleState::Ended,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            (9, 0),
            (17, 0),
        );
        event.cooldown_until = Some(Utc.with_ymd_and_hms(2025, 1, 15, 17, 0, 0).unwrap());
        let event_id = event.id;

        let mut event_repo = MockEventLifecycleRepository::new();
        let audit_repo = MockAuditLogRepository::new();

        event_repo
            .expect_list_cooldown_elapsed()
            .with(eq(now))
            .returning(move |_| {
                let events = vec![event.clone()];
                Box::pin(async move { Ok(events) })
            });
        event_repo
            .expect_mark_disabled()
            .with(eq(event_id), eq(now))
            .times(1)
            .returning(|_, _| Box::pin(async move { Ok(1) }));
        empty_phases(&mut event_repo, "cooldown");

        let usecase = LifecycleTransitionUseCase::new(
            Arc::new(event_repo),
            Arc::new(audit_repo),
            archival_with_defaults(),
        );

        let result = usecase.run(now).await.unwrap();
        assert_eq!(result.disabled, 1);
        assert_eq!(result.disabled_ids, vec![event_id]);
        assert_eq!(result.row_failures, 0);
    }

    #[tokio::test]
    async fn archival_failure_skips_the_row_and_continues() {
        let now = Utc.with_ymd_and_hms(2025, 1, 16, 0, 0, 0).unwrap();
        let first = sample_event(
            LifecycleState::Ended,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            (9, 0),
            (17, 0),
        );
        let second = sample_event(
            LifecycleState::Cooling,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            (9, 0),
            (17, 0),
        );
        let first_id = first.id;
        let second_id = second.id;

        let mut stats_repo = MockEventStatsRepository::new();
        let mut archival_event_repo = MockEventLifecycleRepository::new();
        let mut archival_audit_repo = MockAuditLogRepository::new();

        stats_repo.expect_aggregate().returning(move |event_id| {
            Box::pin(async move {
                if event_id == first_id {
                    anyhow::bail!("aggregation failed")
                }
                Ok(EventStats::default())
            })
        });
        archival_event_repo
            .expect_store_archived_summary()
            .returning(|_, _, _| Box::pin(async move { Ok(1) }));
        archival_audit_repo
            .expect_append()
            .returning(|_| Box::pin(async move { Ok(1) }));

        let archival = Arc::new(ArchivalUseCase::new(
            Arc::new(stats_repo),
            Arc::new(archival_event_repo),
            Arc::new(archival_audit_repo),
        ));

        let mut event_repo = MockEventLifecycleRepository::new();
        let audit_repo = MockAuditLogRepository::new();

        let events = vec![first.clone(), second.clone()];
        event_repo
            .expect_list_cooldown_elapsed()
            .returning(move |_| {
                let events = events.clone();
                Box::pin(async move { Ok(events) })
            });
        event_repo
            .expect_mark_disabled()
            .with(eq(second_id), eq(now))
            .times(1)
            .returning(|_, _| Box::pin(async move { Ok(1) }));
        empty_phases(&mut event_repo, "cooldown");

        let usecase =
            LifecycleTransitionUseCase::new(Arc::new(event_repo), Arc::new(audit_repo), archival);

        let result = usecase.run(now).await.unwrap();
        assert_eq!(result.disabled, 1);
        assert_eq!(result.row_failures, 1);
        assert_eq!(result.disabled_ids, vec![second_id]);
    }
}
