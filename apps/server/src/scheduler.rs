//! Background cache and session sweeper.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info};

use crate::main_lib::AppState;

/// Starts the periodic sweep of stale cache entries and expired sessions.
pub fn start_sweep_scheduler(state: Arc<AppState>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Sweep scheduler started ({}s interval)", every.as_secs());

        let mut sweep_interval = interval(every);
        // First tick is immediate; nothing is stale yet.
        sweep_interval.tick().await;

        loop {
            sweep_interval.tick().await;
            run_sweep(&state);
        }
    })
}

/// Runs a single sweep.
pub fn run_sweep(state: &AppState) {
    let entries = state.cache.sweep();
    let sessions = state.sessions.sweep();
    if entries > 0 || sessions > 0 {
        info!(
            "Sweep removed {} cache entries and {} sessions",
            entries, sessions
        );
    } else {
        debug!("Sweep found nothing to remove");
    }
}
