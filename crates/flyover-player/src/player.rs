//! The async driver for a path animation run.
//!
//! The animator decides what each frame looks like; the player owns all
//! timing. It stages the scene, then alternates strictly between applying a
//! frame and waiting for the surface's camera to settle, so the camera
//! backpressures the animation. Cancellation is honored at every wait.

use crate::surface::{CameraTransit, MapSurface, SurfaceError};
use flyover_core::animator::{AnimateError, MarkerFrame, PathAnimator, StepOutcome};
use flyover_core::surface::{
    AnnotationOptions, AIRCRAFT_MARKER, DESTINATION_MARKER, LANDING_MARKER, ORIGIN_MARKER,
    ROUTE_LINE, TRAIL_LINE,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Default bound on any single camera wait.
const DEFAULT_CAMERA_WATCHDOG: Duration = Duration::from_secs(10);
/// Default frame interval of the landing offset interpolation.
const DEFAULT_SETTLE_TICK: Duration = Duration::from_millis(16);

/// Timing knobs for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerSettings {
    /// Longest the player waits for one camera move before giving up.
    pub camera_watchdog: Duration,
    /// How often the landing offset is re-interpolated while settling.
    pub settle_tick: Duration,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            camera_watchdog: DEFAULT_CAMERA_WATCHDOG,
            settle_tick: DEFAULT_SETTLE_TICK,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The marker landed and the settle effect finished.
    Completed,
    /// A cancel signal arrived; no further surface commands were issued.
    Cancelled,
    /// The surface was torn down mid-run; no further commands were issued.
    SurfaceLost,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayReport {
    pub outcome: PlayOutcome,
    /// Marker frames fully applied to the surface.
    pub frames: usize,
}

/// Failures that abort a run outright.
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error(transparent)]
    Animate(#[from] AnimateError),
    #[error("camera did not settle within {0:?}")]
    CameraStalled(Duration),
}

enum Progress {
    Finished,
    Cancelled,
}

/// Plays one animation run against a [`MapSurface`].
pub struct Player {
    surface: Arc<dyn MapSurface>,
    animator: PathAnimator,
    settings: PlayerSettings,
}

impl Player {
    pub fn new(surface: Arc<dyn MapSurface>, animator: PathAnimator) -> Self {
        Self::with_settings(surface, animator, PlayerSettings::default())
    }

    pub fn with_settings(
        surface: Arc<dyn MapSurface>,
        animator: PathAnimator,
        settings: PlayerSettings,
    ) -> Self {
        Self {
            surface,
            animator,
            settings,
        }
    }

    /// Play the full run, honoring `cancel` at every wait.
    pub async fn play(
        mut self,
        mut cancel: broadcast::Receiver<()>,
    ) -> Result<PlayReport, PlayerError> {
        let route = self.animator.route();
        tracing::info!(
            "flyover starting: {} route points, {} -> {}",
            route.len(),
            route.origin(),
            route.destination()
        );
        self.animator.start()?;

        let mut frames = 0usize;
        let outcome = self.drive(&mut cancel, &mut frames).await?;
        match outcome {
            PlayOutcome::Completed => {
                tracing::info!("flyover completed after {} frames", frames);
            }
            PlayOutcome::Cancelled => {
                self.animator.cancel();
                tracing::info!("flyover cancelled after {} frames", frames);
            }
            PlayOutcome::SurfaceLost => {
                self.animator.cancel();
                tracing::warn!("map surface went away after {} frames", frames);
            }
        }
        Ok(PlayReport { outcome, frames })
    }

    /// Play with no external cancel signal.
    pub async fn play_to_end(self) -> Result<PlayReport, PlayerError> {
        let (_cancel_tx, cancel_rx) = broadcast::channel(1);
        self.play(cancel_rx).await
    }

    async fn drive(
        &mut self,
        cancel: &mut broadcast::Receiver<()>,
        frames: &mut usize,
    ) -> Result<PlayOutcome, PlayerError> {
        let staging = match self.stage() {
            Ok(transit) => transit,
            Err(SurfaceError::TornDown) => return Ok(PlayOutcome::SurfaceLost),
        };
        if let Progress::Cancelled = self.await_camera(cancel, staging).await? {
            return Ok(PlayOutcome::Cancelled);
        }

        loop {
            let outcome = self.animator.step()?;
            let arrived = matches!(outcome, StepOutcome::Arrived(_));
            let transit = match self.apply_frame(outcome.frame()) {
                Ok(transit) => transit,
                Err(SurfaceError::TornDown) => return Ok(PlayOutcome::SurfaceLost),
            };
            *frames += 1;
            if let Progress::Cancelled = self.await_camera(cancel, transit).await? {
                return Ok(PlayOutcome::Cancelled);
            }
            if arrived {
                break;
            }
        }

        match self.land(cancel).await {
            Ok(Progress::Finished) => {}
            Ok(Progress::Cancelled) => return Ok(PlayOutcome::Cancelled),
            Err(SurfaceError::TornDown) => return Ok(PlayOutcome::SurfaceLost),
        }

        self.animator.complete();
        Ok(PlayOutcome::Completed)
    }

    /// Place the endpoint markers and route line, then fly to the origin.
    fn stage(&self) -> Result<CameraTransit, SurfaceError> {
        let route = self.animator.route();
        self.surface.set_marker_position(ORIGIN_MARKER, route.origin())?;
        self.surface
            .set_marker_position(DESTINATION_MARKER, route.destination())?;
        self.surface.set_line_geometry(ROUTE_LINE, route.points())?;
        self.surface.set_line_geometry(TRAIL_LINE, route.trail(0))?;
        self.surface
            .fly_camera_to(route.origin(), self.animator.config().camera)
    }

    fn apply_frame(&self, frame: &MarkerFrame) -> Result<CameraTransit, SurfaceError> {
        self.surface
            .set_marker_position(AIRCRAFT_MARKER, frame.position)?;
        self.surface
            .set_marker_rotation(AIRCRAFT_MARKER, frame.rotation_deg)?;
        self.surface
            .set_marker_scale(AIRCRAFT_MARKER, frame.icon_scale)?;
        self.surface.set_line_geometry(TRAIL_LINE, &frame.trail)?;
        tracing::debug!("frame {} applied, marker at {}", frame.cursor, frame.position);
        self.surface.fly_camera_to(frame.position, frame.camera)
    }

    async fn await_camera(
        &self,
        cancel: &mut broadcast::Receiver<()>,
        transit: CameraTransit,
    ) -> Result<Progress, PlayerError> {
        tokio::select! {
            _ = cancel_signalled(cancel) => Ok(Progress::Cancelled),
            settled = tokio::time::timeout(self.settings.camera_watchdog, transit.wait()) => {
                match settled {
                    Ok(()) => Ok(Progress::Finished),
                    Err(_) => {
                        tracing::error!(
                            "camera did not settle within {:?}, abandoning run",
                            self.settings.camera_watchdog
                        );
                        Err(PlayerError::CameraStalled(self.settings.camera_watchdog))
                    }
                }
            }
        }
    }

    /// Drop the landing marker, ease it onto the surface, then annotate.
    async fn land(&self, cancel: &mut broadcast::Receiver<()>) -> Result<Progress, SurfaceError> {
        let plan = self.animator.landing_plan();
        self.surface
            .set_marker_position(LANDING_MARKER, plan.position)?;
        self.surface
            .set_marker_offset(LANDING_MARKER, plan.drop_offset_px)?;

        let dropped_at = tokio::time::Instant::now();
        loop {
            tokio::select! {
                _ = cancel_signalled(cancel) => return Ok(Progress::Cancelled),
                _ = tokio::time::sleep(self.settings.settle_tick) => {}
            }
            let t = (dropped_at.elapsed().as_secs_f64() / plan.settle.as_secs_f64()).min(1.0);
            let offset = lerp(plan.drop_offset_px, plan.rest_offset_px, t);
            self.surface.set_marker_offset(LANDING_MARKER, offset)?;
            if t >= 1.0 {
                break;
            }
        }

        if let Some(annotation) = &plan.annotation {
            let options = AnnotationOptions {
                reveal_stagger_ms: annotation.reveal_stagger.as_millis() as u64,
            };
            self.surface
                .add_annotation(annotation.position, &annotation.text, options)?;
            tracing::debug!("annotated destination with {:?}", annotation.text);
        }
        Ok(Progress::Finished)
    }
}

/// Resolves once a cancel signal arrives; pends forever if none can.
async fn cancel_signalled(cancel: &mut broadcast::Receiver<()>) {
    loop {
        match cancel.recv().await {
            Ok(()) => return,
            // Missed signals still mean someone asked to cancel.
            Err(RecvError::Lagged(_)) => return,
            Err(RecvError::Closed) => std::future::pending::<()>().await,
        }
    }
}

fn lerp(from: (f64, f64), to: (f64, f64), t: f64) -> (f64, f64) {
    (
        from.0 + (to.0 - from.0) * t,
        from.1 + (to.1 - from.1) * t,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{CameraControl, RecordingSurface};
    use crate::simulated::SimulatedSurface;
    use flyover_core::animator::AnimatorConfig;
    use flyover_core::arc::ArcBuilder;
    use flyover_core::geo::Coordinate;
    use flyover_core::surface::SurfaceCommand;

    const ORIGIN: Coordinate = Coordinate {
        lon: -122.414,
        lat: 37.776,
    };
    const DESTINATION: Coordinate = Coordinate {
        lon: -96.171851,
        lat: 31.829513,
    };

    fn demo_animator(steps: usize, label: Option<&str>) -> PathAnimator {
        let route = ArcBuilder::new(steps, 1.0).build(ORIGIN, DESTINATION).unwrap();
        let mut config = AnimatorConfig::default();
        config.destination_label = label.map(|s| s.to_string());
        PathAnimator::with_config(route, config)
    }

    async fn wait_for_transits(camera: &CameraControl, n: usize) {
        while camera.in_transit() < n {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn a_full_run_emits_every_frame_then_lands_and_annotates() {
        let surface = RecordingSurface::new();
        let player = Player::new(Arc::new(surface.clone()), demo_animator(10, Some("Texas")));

        let report = player.play_to_end().await.unwrap();
        assert_eq!(report.outcome, PlayOutcome::Completed);
        assert_eq!(report.frames, 11);

        let positions = surface.positions_of(AIRCRAFT_MARKER);
        assert_eq!(positions.len(), 11);
        assert_eq!(positions[0], ORIGIN);
        assert_eq!(positions[10], DESTINATION);

        // The landing marker drops in raised and settles onto the surface.
        let offsets = surface.offsets_of(LANDING_MARKER);
        assert_eq!(offsets[0], (0.0, -50.0));
        assert_eq!(*offsets.last().unwrap(), (0.0, -14.0));
        assert!(offsets.windows(2).all(|pair| pair[0].1 <= pair[1].1));

        let commands = surface.commands();
        match commands.last().unwrap() {
            SurfaceCommand::AddAnnotation { text, position, .. } => {
                assert_eq!(text, "Texas");
                assert_eq!(*position, DESTINATION);
            }
            other => panic!("expected the annotation last, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn frames_advance_only_after_each_camera_settles() {
        let (surface, camera) = RecordingSurface::with_manual_camera();
        let player = Player::new(Arc::new(surface.clone()), demo_animator(4, None));
        let run = tokio::spawn(player.play_to_end());

        // Staging flies to the origin before any aircraft frame.
        wait_for_transits(&camera, 1).await;
        assert!(surface.positions_of(AIRCRAFT_MARKER).is_empty());
        camera.release_next();

        for frame in 1..=5 {
            wait_for_transits(&camera, 1).await;
            assert_eq!(surface.positions_of(AIRCRAFT_MARKER).len(), frame);
            camera.release_next();
        }

        let report = run.await.unwrap().unwrap();
        assert_eq!(report.outcome, PlayOutcome::Completed);
        assert_eq!(report.frames, 5);
    }

    #[tokio::test]
    async fn cancel_mid_flight_stops_all_side_effects() {
        let (surface, camera) = RecordingSurface::with_manual_camera();
        let player = Player::new(Arc::new(surface.clone()), demo_animator(10, Some("Texas")));
        let (cancel_tx, cancel_rx) = broadcast::channel(1);
        let run = tokio::spawn(player.play(cancel_rx));

        wait_for_transits(&camera, 1).await;
        camera.release_next();
        for _ in 0..3 {
            wait_for_transits(&camera, 1).await;
            camera.release_next();
        }

        // Cancel while the fourth frame's camera is still in flight.
        wait_for_transits(&camera, 1).await;
        let commands_at_cancel = surface.commands().len();
        cancel_tx.send(()).unwrap();

        let report = run.await.unwrap().unwrap();
        assert_eq!(report.outcome, PlayOutcome::Cancelled);
        assert_eq!(surface.commands().len(), commands_at_cancel);
        assert!(surface.positions_of(LANDING_MARKER).is_empty());
    }

    #[tokio::test]
    async fn teardown_mid_run_ends_the_run_without_further_commands() {
        let (surface, camera) = RecordingSurface::with_manual_camera();
        let player = Player::new(Arc::new(surface.clone()), demo_animator(10, None));
        let run = tokio::spawn(player.play_to_end());

        wait_for_transits(&camera, 1).await;
        camera.release_next();
        wait_for_transits(&camera, 1).await;
        surface.teardown();
        camera.release_next();

        let report = run.await.unwrap().unwrap();
        assert_eq!(report.outcome, PlayOutcome::SurfaceLost);
        assert!(matches!(
            surface.commands().last().unwrap(),
            SurfaceCommand::Teardown
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn a_wedged_camera_trips_the_watchdog() {
        let (surface, _camera) = RecordingSurface::with_manual_camera();
        let player = Player::new(Arc::new(surface), demo_animator(3, None));

        let error = player.play_to_end().await.unwrap_err();
        match error {
            PlayerError::CameraStalled(waited) => {
                assert_eq!(waited, Duration::from_secs(10));
            }
            other => panic!("expected a stalled camera, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn a_completed_run_leaves_the_landed_scene_on_the_surface() {
        let surface = SimulatedSurface::new(Duration::from_millis(120));
        let animator = demo_animator(20, Some("Texas"));
        let route_len = animator.route().len();
        let player = Player::new(Arc::new(surface.clone()), animator);

        let report = player.play_to_end().await.unwrap();
        assert_eq!(report.outcome, PlayOutcome::Completed);

        let aircraft = surface.marker(AIRCRAFT_MARKER).unwrap();
        assert_eq!(aircraft.position, DESTINATION);
        assert!(aircraft.scale.abs() < 1e-9);

        let landing = surface.marker(LANDING_MARKER).unwrap();
        assert_eq!(landing.offset_px, (0.0, -14.0));

        assert_eq!(surface.line(ROUTE_LINE).unwrap().len(), route_len);
        assert_eq!(surface.line(TRAIL_LINE).unwrap().len(), route_len);
        assert_eq!(
            surface.annotations(),
            vec![(DESTINATION, "Texas".to_string())]
        );
        assert_eq!(surface.camera_center(), Some(DESTINATION));
    }

    #[tokio::test]
    async fn an_already_torn_down_surface_reports_surface_lost() {
        let surface = RecordingSurface::new();
        surface.teardown();
        let player = Player::new(Arc::new(surface.clone()), demo_animator(5, None));

        let report = player.play_to_end().await.unwrap();
        assert_eq!(report.outcome, PlayOutcome::SurfaceLost);
        assert_eq!(report.frames, 0);
        assert!(surface.positions_of(AIRCRAFT_MARKER).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn a_single_point_route_completes_in_one_frame() {
        let route = ArcBuilder::new(150, 1.0).build(ORIGIN, ORIGIN).unwrap();
        assert_eq!(route.len(), 1);

        let surface = RecordingSurface::new();
        let player = Player::new(Arc::new(surface.clone()), PathAnimator::new(route));

        let report = player.play_to_end().await.unwrap();
        assert_eq!(report.outcome, PlayOutcome::Completed);
        assert_eq!(report.frames, 1);
        assert_eq!(surface.positions_of(AIRCRAFT_MARKER), vec![ORIGIN]);
    }
}
