//! Purges expired refresh-token sessions.

use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use glow_db::repositories::SessionRepo;

use crate::state::AppState;

const PURGE_INTERVAL_SECS: u64 = 3600;

pub fn spawn(state: AppState, shutdown: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(PURGE_INTERVAL_SECS));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("session retention task stopping");
                    return;
                }
                _ = interval.tick() => {}
            }
            match SessionRepo::delete_expired(&state.pool, Utc::now()).await {
                Ok(0) => {}
                Ok(purged) => tracing::info!(purged, "expired sessions purged"),
                Err(e) => tracing::error!(error = %e, "session purge failed"),
            }
        }
    })
}
