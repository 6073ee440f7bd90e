use anyhow::Result;
use chrono::Utc;
use std::{sync::Arc, time::Duration};
use tracing::{error, info};

use crate::application::usecases::{
    lifecycle_transition::LifecycleTransitionUseCase, payment_expiration::PaymentExpirationUseCase,
};

/// Periodic sweeps with a retry-at-next-tick policy: a failed run is logged
/// and the loop simply waits for the next interval. Each loop takes one
/// `Utc::now()` snapshot per run so every phase of a sweep sees the same
/// clock.
pub async fn run_payment_expiration_loop(
    usecase: Arc<PaymentExpirationUseCase>,
    interval: Duration,
) -> Result<()> {
    info!(interval_secs = interval.as_secs(), "payment_expiration: loop started");

    loop {
        if let Err(e) = usecase.run(Utc::now()).await {
            error!("payment_expiration: sweep failed, retrying at next tick: {e:#}");
        }

        tokio::time::sleep(interval).await;
    }
}

pub async fn run_lifecycle_transition_loop(
    usecase: Arc<LifecycleTransitionUseCase>,
    interval: Duration,
) -> Result<()> {
    info!(interval_secs = interval.as_secs(), "lifecycle_transition: loop started");

    loop {
        if let Err(e) = usecase.run(Utc::now()).await {
            error!("lifecycle_transition: sweep failed, retrying at next tick: {e:#}");
        }

        tokio::time::sleep(interval).await;
    }
}
