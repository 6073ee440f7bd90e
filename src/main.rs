use anyhow::Result;
use invite_lifecycle::application::usecases::{
    archival::ArchivalUseCase, lifecycle_transition::LifecycleTransitionUseCase,
    payment_expiration::PaymentExpirationUseCase, state_transition::StateTransitionUseCase,
};
use invite_lifecycle::config::config_loader;
use invite_lifecycle::domain::repositories::{
    account_flags::AccountFlagRepository, audit_logs::AuditLogRepository,
    event_lifecycle::EventLifecycleRepository, event_state::EventStateRepository,
    event_stats::EventStatsRepository, payment_orders::PaymentOrderRepository,
};
use invite_lifecycle::infrastructure::postgres::{
    postgres_connection,
    repositories::{
        account_flags::AccountFlagPostgres, audit_logs::AuditLogPostgres,
        event_lifecycle::EventLifecyclePostgres, event_state::EventStatePostgres,
        event_stats::EventStatsPostgres, payment_orders::PaymentOrderPostgres,
    },
};
use invite_lifecycle::jobs::worker_loop;
use invite_lifecycle::observability;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Lifecycle engine exited with error: {}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    observability::init_observability("lifecycle-engine")?;

    let dotenvy_env = config_loader::load()?;
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(&dotenvy_env.database.url)?;
    info!("Postgres connection has been established");

    let db_pool_arc = Arc::new(postgres_pool);

    let event_state_repository: Arc<dyn EventStateRepository + Send + Sync> =
        Arc::new(EventStatePostgres::new(Arc::clone(&db_pool_arc)));
    let event_lifecycle_repository: Arc<dyn EventLifecycleRepository + Send + Sync> =
        Arc::new(EventLifecyclePostgres::new(Arc::clone(&db_pool_arc)));
    let payment_order_repository: Arc<dyn PaymentOrderRepository + Send + Sync> =
        Arc::new(PaymentOrderPostgres::new(Arc::clone(&db_pool_arc)));
    let account_flag_repository: Arc<dyn AccountFlagRepository + Send + Sync> =
        Arc::new(AccountFlagPostgres::new(Arc::clone(&db_pool_arc)));
    let audit_log_repository: Arc<dyn AuditLogRepository + Send + Sync> =
        Arc::new(AuditLogPostgres::new(Arc::clone(&db_pool_arc)));
    let event_stats_repository: Arc<dyn EventStatsRepository + Send + Sync> =
        Arc::new(EventStatsPostgres::new(Arc::clone(&db_pool_arc)));

    let state_transition_usecase = Arc::new(StateTransitionUseCase::new(
        Arc::clone(&event_state_repository),
        Arc::clone(&audit_log_repository),
    ));

    let payment_expiration_usecase = Arc::new(PaymentExpirationUseCase::new(
        Arc::clone(&payment_order_repository),
        Arc::clone(&account_flag_repository),
        Arc::clone(&audit_log_repository),
        Arc::clone(&state_transition_usecase),
    ));

    let archival_usecase = Arc::new(ArchivalUseCase::new(
        Arc::clone(&event_stats_repository),
        Arc::clone(&event_lifecycle_repository),
        Arc::clone(&audit_log_repository),
    ));

    let lifecycle_transition_usecase = Arc::new(LifecycleTransitionUseCase::new(
        Arc::clone(&event_lifecycle_repository),
        Arc::clone(&audit_log_repository),
        Arc::clone(&archival_usecase),
    ));

    let payment_expiration_loop = tokio::spawn(worker_loop::run_payment_expiration_loop(
        payment_expiration_usecase,
        Duration::from_secs(dotenvy_env.jobs.payment_expiration_interval_secs),
    ));

    let lifecycle_transition_loop = tokio::spawn(worker_loop::run_lifecycle_transition_loop(
        lifecycle_transition_usecase,
        Duration::from_secs(dotenvy_env.jobs.lifecycle_transition_interval_secs),
    ));

    tokio::select! {
        result = payment_expiration_loop => result??,
        result = lifecycle_transition_loop => result??,
    };

    Ok(())
}
