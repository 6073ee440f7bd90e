use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::{
    entities::audit_logs::NewAuditRecord,
    repositories::{
        audit_logs::AuditLogRepository, event_lifecycle::EventLifecycleRepository,
        event_stats::EventStatsRepository,
    },
    value_objects::{archived_summary::ArchivedSummary, enums::audit_actions::AuditAction},
};

/// Computes and persists the final statistics summary for one event. The
/// summary must be durable before any opt-in purge of detail rows elsewhere;
/// this usecase never deletes anything.
pub struct ArchivalUseCase {
    stats_repo: Arc<dyn EventStatsRepository + Send + Sync>,
    event_repo: Arc<dyn EventLifecycleRepository + Send + Sync>,
    audit_repo: Arc<dyn AuditLogRepository + Send + Sync>,
}

impl ArchivalUseCase {
    pub fn new(
        stats_repo: Arc<dyn EventStatsRepository + Send + Sync>,
        event_repo: Arc<dyn EventLifecycleRepository + Send + Sync>,
        audit_repo: Arc<dyn AuditLogRepository + Send + Sync>,
    ) -> Self {
        Self {
            stats_repo,
            event_repo,
            audit_repo,
        }
    }

    pub async fn archive_event(
        &self,
        event_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<ArchivedSummary> {
        let stats = self
            .stats_repo
            .aggregate(event_id)
            .await
            .context("archival: failed to aggregate event statistics")?;

        let summary = ArchivedSummary::from_stats(stats, now);
        let summary_json =
            serde_json::to_value(&summary).context("archival: failed to serialize summary")?;

        // Summary first, ledger second: the summary write is the durability
        // point, the audit record references it.
        let affected = self
            .event_repo
            .store_archived_summary(event_id, summary_json.clone(), now)
            .await?;
        if affected == 0 {
            bail!("archival: event {} not found when storing summary", event_id);
        }

        self.audit_repo
            .append(NewAuditRecord {
                event_id: Some(event_id),
                user_id: None,
                action: AuditAction::EventDisabled,
                details: json!({
                    "summary": summary_json,
                    "data_detached": true,
                }),
            })
            .await?;

        info!(%event_id, "archival: summary persisted");

        Ok(summary)
    }
}
