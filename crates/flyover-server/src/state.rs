//! In-memory flight session store using DashMap.

use crate::config::Config;
use crate::stream::FrameEnvelope;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use flyover_core::geo::Coordinate;
use flyover_core::route::Route;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::broadcast;

/// Where a flight session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlightStatus {
    Running,
    Completed,
    Cancelled,
    /// The camera watchdog gave up on the run.
    Stalled,
}

/// One registered flight and its run plumbing.
pub struct FlightSession {
    pub flight_id: String,
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub steps: usize,
    pub curvature: f64,
    pub label: Option<String>,
    pub status: FlightStatus,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Frames the player applied, filled in when the run finishes.
    pub frames: usize,
    pub cancel: broadcast::Sender<()>,
    pub route: Route,
}

impl FlightSession {
    fn snapshot(&self) -> FlightSnapshot {
        FlightSnapshot {
            flight_id: self.flight_id.clone(),
            origin: self.origin,
            destination: self.destination,
            steps: self.steps,
            curvature: self.curvature,
            label: self.label.clone(),
            status: self.status,
            points: self.route.len(),
            distance_m: self.route.distance_m(),
            created_at: self.created_at,
            finished_at: self.finished_at,
            frames: self.frames,
        }
    }
}

/// Serializable view of a flight session.
#[derive(Debug, Clone, Serialize)]
pub struct FlightSnapshot {
    pub flight_id: String,
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub steps: usize,
    pub curvature: f64,
    pub label: Option<String>,
    pub status: FlightStatus,
    pub points: usize,
    pub distance_m: f64,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub frames: usize,
}

/// Everything the runner needs to launch one flight.
pub struct LaunchPlan {
    pub flight_id: String,
    pub route: Route,
    pub label: Option<String>,
    pub cancel: broadcast::Receiver<()>,
    /// Tell consumers to drop the previous scene first (replays).
    pub clear_scene: bool,
}

/// Why a replay request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReplayRefusal {
    #[error("flight not found")]
    NotFound,
    #[error("animation already running")]
    StillRunning,
    #[error("too many active flights")]
    AtCapacity,
}

/// Application state - thread-safe store for flight sessions.
pub struct AppState {
    flights: DashMap<String, FlightSession>,
    flight_counter: AtomicU32,
    /// Frame bus every WebSocket subscriber reads from.
    pub tx: broadcast::Sender<FrameEnvelope>,
    config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let (tx, _) = broadcast::channel(config.frame_buffer.max(1));
        Self {
            flights: DashMap::new(),
            flight_counter: AtomicU32::new(1),
            tx,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get next flight ID.
    pub fn next_flight_id(&self) -> String {
        format!(
            "FLIGHT-{:04}",
            self.flight_counter.fetch_add(1, Ordering::SeqCst)
        )
    }

    /// Register a new flight session and hand back its launch plan.
    pub fn register_flight(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        steps: usize,
        curvature: f64,
        label: Option<String>,
        route: Route,
    ) -> LaunchPlan {
        let flight_id = self.next_flight_id();
        let (cancel_tx, cancel_rx) = broadcast::channel(1);

        let session = FlightSession {
            flight_id: flight_id.clone(),
            origin,
            destination,
            steps,
            curvature,
            label: label.clone(),
            status: FlightStatus::Running,
            created_at: Utc::now(),
            finished_at: None,
            frames: 0,
            cancel: cancel_tx,
            route: route.clone(),
        };
        self.flights.insert(flight_id.clone(), session);

        LaunchPlan {
            flight_id,
            route,
            label,
            cancel: cancel_rx,
            clear_scene: false,
        }
    }

    /// Re-arm a finished flight for another run.
    pub fn begin_replay(&self, flight_id: &str) -> Result<LaunchPlan, ReplayRefusal> {
        let active = self.active_flights();
        let mut session = self
            .flights
            .get_mut(flight_id)
            .ok_or(ReplayRefusal::NotFound)?;

        if session.status == FlightStatus::Running {
            return Err(ReplayRefusal::StillRunning);
        }
        if active >= self.config.max_active_flights {
            return Err(ReplayRefusal::AtCapacity);
        }

        let (cancel_tx, cancel_rx) = broadcast::channel(1);
        session.status = FlightStatus::Running;
        session.finished_at = None;
        session.frames = 0;
        session.cancel = cancel_tx;

        Ok(LaunchPlan {
            flight_id: session.flight_id.clone(),
            route: session.route.clone(),
            label: session.label.clone(),
            cancel: cancel_rx,
            clear_scene: true,
        })
    }

    /// Record how a run ended.
    pub fn finish_flight(&self, flight_id: &str, status: FlightStatus, frames: usize) {
        if let Some(mut session) = self.flights.get_mut(flight_id) {
            session.status = status;
            session.finished_at = Some(Utc::now());
            session.frames = frames;
        }
    }

    /// Signal a running flight's cancel channel.
    ///
    /// `None` for unknown flights, `Some(false)` when the flight is not
    /// running, `Some(true)` once the signal is on its way.
    pub fn cancel_flight(&self, flight_id: &str) -> Option<bool> {
        let session = self.flights.get(flight_id)?;
        if session.status != FlightStatus::Running {
            return Some(false);
        }
        let _ = session.cancel.send(());
        Some(true)
    }

    pub fn get_flight(&self, flight_id: &str) -> Option<FlightSnapshot> {
        self.flights.get(flight_id).map(|s| s.snapshot())
    }

    pub fn get_all_flights(&self) -> Vec<FlightSnapshot> {
        let mut snapshots: Vec<FlightSnapshot> =
            self.flights.iter().map(|s| s.snapshot()).collect();
        snapshots.sort_by(|a, b| a.flight_id.cmp(&b.flight_id));
        snapshots
    }

    pub fn route_of(&self, flight_id: &str) -> Option<Route> {
        self.flights.get(flight_id).map(|s| s.route.clone())
    }

    /// Number of sessions currently running.
    pub fn active_flights(&self) -> usize {
        self.flights
            .iter()
            .filter(|s| s.status == FlightStatus::Running)
            .count()
    }

    /// Drop finished sessions older than `ttl`. Returns how many went away.
    pub fn prune_finished(&self, ttl: Duration) -> usize {
        let cutoff = Utc::now() - ttl;
        let before = self.flights.len();
        self.flights.retain(|_, session| match session.finished_at {
            Some(finished_at) => finished_at > cutoff,
            None => true,
        });
        before - self.flights.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flyover_core::arc::ArcBuilder;

    fn test_state() -> AppState {
        AppState::new(Config::from_env())
    }

    fn test_route() -> Route {
        ArcBuilder::new(10, 1.0)
            .build(Coordinate::new(-122.414, 37.776), Coordinate::new(-96.17, 31.83))
            .unwrap()
    }

    fn register(state: &AppState) -> LaunchPlan {
        let route = test_route();
        state.register_flight(
            route.origin(),
            route.destination(),
            10,
            1.0,
            Some("Texas".to_string()),
            route,
        )
    }

    #[test]
    fn flight_ids_are_sequential_and_zero_padded() {
        let state = test_state();
        assert_eq!(state.next_flight_id(), "FLIGHT-0001");
        assert_eq!(state.next_flight_id(), "FLIGHT-0002");
    }

    #[test]
    fn registered_flights_show_up_as_running_snapshots() {
        let state = test_state();
        let plan = register(&state);
        assert_eq!(state.active_flights(), 1);

        let snapshot = state.get_flight(&plan.flight_id).unwrap();
        assert_eq!(snapshot.status, FlightStatus::Running);
        assert_eq!(snapshot.points, 11);
        assert_eq!(snapshot.label.as_deref(), Some("Texas"));
        assert!(snapshot.finished_at.is_none());
    }

    #[test]
    fn cancel_reaches_the_session_channel_only_while_running() {
        let state = test_state();
        let mut plan = register(&state);

        assert_eq!(state.cancel_flight(&plan.flight_id), Some(true));
        assert!(plan.cancel.try_recv().is_ok());

        state.finish_flight(&plan.flight_id, FlightStatus::Cancelled, 3);
        assert_eq!(state.cancel_flight(&plan.flight_id), Some(false));
        assert_eq!(state.cancel_flight("FLIGHT-9999"), None);
    }

    #[test]
    fn replay_is_refused_while_the_flight_is_running() {
        let state = test_state();
        let plan = register(&state);
        assert!(matches!(
            state.begin_replay(&plan.flight_id),
            Err(ReplayRefusal::StillRunning)
        ));
        assert!(matches!(
            state.begin_replay("FLIGHT-9999"),
            Err(ReplayRefusal::NotFound)
        ));

        state.finish_flight(&plan.flight_id, FlightStatus::Completed, 11);
        let replay = state.begin_replay(&plan.flight_id).unwrap();
        assert!(replay.clear_scene);
        assert_eq!(replay.flight_id, plan.flight_id);
        assert_eq!(
            state.get_flight(&plan.flight_id).unwrap().status,
            FlightStatus::Running
        );
    }

    #[test]
    fn prune_drops_only_finished_sessions_past_the_ttl() {
        let state = test_state();
        let finished = register(&state);
        let running = register(&state);
        state.finish_flight(&finished.flight_id, FlightStatus::Completed, 11);

        assert_eq!(state.prune_finished(Duration::seconds(0)), 1);
        assert!(state.get_flight(&finished.flight_id).is_none());
        assert!(state.get_flight(&running.flight_id).is_some());
    }
}
