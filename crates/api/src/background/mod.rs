//! Periodic background tasks. Each one runs on its own interval and
//! stops when the shared shutdown token fires.

pub mod missed_sweep;
pub mod occurrence_seeder;
pub mod session_retention;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

pub fn spawn_all(state: &AppState, shutdown: &CancellationToken) -> Vec<JoinHandle<()>> {
    vec![
        occurrence_seeder::spawn(state.clone(), shutdown.clone()),
        missed_sweep::spawn(state.clone(), shutdown.clone()),
        session_retention::spawn(state.clone(), shutdown.clone()),
    ]
}
