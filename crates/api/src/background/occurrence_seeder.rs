//! Creates each day's pending completion rows shortly after the day
//! starts in every subscriber's timezone.

use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::engine::occurrences::seed_current_occurrences;
use crate::state::AppState;

pub fn spawn(state: AppState, shutdown: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(Duration::from_secs(state.config.seeder_interval_secs));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("occurrence seeder stopping");
                    return;
                }
                _ = interval.tick() => {}
            }
            match seed_current_occurrences(&state.pool, Utc::now()).await {
                Ok(0) => tracing::debug!("occurrence seeder: nothing to create"),
                Ok(created) => tracing::info!(created, "occurrence seeder created rows"),
                Err(e) => tracing::error!(error = ?e, "occurrence seeder cycle failed"),
            }
        }
    })
}
