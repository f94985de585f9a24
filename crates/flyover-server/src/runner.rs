//! Launches player tasks for registered flights.

use crate::state::{AppState, FlightStatus, LaunchPlan};
use crate::stream::BroadcastSurface;
use flyover_core::animator::{AnimatorConfig, PathAnimator};
use flyover_player::{PlayOutcome, Player, PlayerSettings};
use std::sync::Arc;
use std::time::Duration;

/// Spawn the player task for one flight.
pub fn spawn_flight(state: Arc<AppState>, plan: LaunchPlan) {
    let camera_settle = Duration::from_millis(state.config().camera_settle_ms);
    let settings = PlayerSettings {
        camera_watchdog: Duration::from_secs(state.config().camera_watchdog_s),
        ..PlayerSettings::default()
    };

    let surface = BroadcastSurface::new(plan.flight_id.clone(), state.tx.clone(), camera_settle);
    if plan.clear_scene {
        surface.clear_scene();
    }

    let mut config = AnimatorConfig::default();
    config.destination_label = plan.label;
    let animator = PathAnimator::with_config(plan.route, config);
    let player = Player::with_settings(Arc::new(surface), animator, settings);

    let flight_id = plan.flight_id;
    let cancel = plan.cancel;
    tokio::spawn(async move {
        let (status, frames) = match player.play(cancel).await {
            Ok(report) => {
                let status = match report.outcome {
                    PlayOutcome::Completed => FlightStatus::Completed,
                    PlayOutcome::Cancelled | PlayOutcome::SurfaceLost => FlightStatus::Cancelled,
                };
                (status, report.frames)
            }
            Err(error) => {
                tracing::error!("flight {} aborted: {}", flight_id, error);
                (FlightStatus::Stalled, 0)
            }
        };
        state.finish_flight(&flight_id, status, frames);
        tracing::info!(
            "flight {} finished as {:?} after {} frames",
            flight_id,
            status,
            frames
        );
    });
}
