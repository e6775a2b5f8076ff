//! Flips pending completions to missed once their grace period has
//! fully elapsed.

use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use glow_db::repositories::CompletionRepo;

use crate::state::AppState;

pub fn spawn(state: AppState, shutdown: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(Duration::from_secs(state.config.sweep_interval_secs));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("missed-status sweep stopping");
                    return;
                }
                _ = interval.tick() => {}
            }
            match CompletionRepo::mark_missed_expired(&state.pool, Utc::now()).await {
                Ok(0) => tracing::debug!("missed-status sweep: nothing expired"),
                Ok(flipped) => tracing::info!(flipped, "missed-status sweep marked rows"),
                Err(e) => tracing::error!(error = %e, "missed-status sweep failed"),
            }
        }
    })
}
