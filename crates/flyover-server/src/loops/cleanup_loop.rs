//! Flight session cleanup loop.
//!
//! Drops finished flight sessions once they outlive the retention window.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::interval;

use crate::state::AppState;

pub async fn run_cleanup_loop(state: Arc<AppState>, mut shutdown: broadcast::Receiver<()>) {
    let mut ticker = interval(Duration::from_secs(state.config().cleanup_interval_s));
    let ttl = chrono::Duration::seconds(state.config().flight_ttl_s);

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                tracing::info!("Cleanup loop shutting down");
                break;
            }
            _ = ticker.tick() => {
                let pruned = state.prune_finished(ttl);
                if pruned > 0 {
                    tracing::info!("Pruned {} finished flight sessions", pruned);
                }
            }
        }
    }
}
