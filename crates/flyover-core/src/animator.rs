//! The path animation state machine.
//!
//! `PathAnimator` owns a route and the single-writer animation state, and
//! exposes one stepping function. It computes what each frame should look
//! like; all timing, scheduling, and surface I/O belong to the driver.

use crate::geo::Coordinate;
use crate::route::Route;
use crate::surface::CameraOptions;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::time::Duration;

/// Pixel offset the landing marker drops in from.
const LANDING_DROP_OFFSET_PX: (f64, f64) = (0.0, -50.0);
/// Pixel offset the landing marker rests at.
const LANDING_REST_OFFSET_PX: (f64, f64) = (0.0, -14.0);
/// Wall-clock duration of the landing settle effect.
const LANDING_SETTLE: Duration = Duration::from_millis(100);
/// Per-character delay of the annotation reveal.
const ANNOTATION_STAGGER: Duration = Duration::from_millis(100);

/// Where an animator is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationPhase {
    /// No active run; `start` is the only valid call.
    #[default]
    Idle,
    /// Stepping along the route.
    Running,
    /// Past the final frame, playing the landing effect.
    Settling,
}

/// Invalid animator transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AnimateError {
    #[error("animation already running")]
    AlreadyRunning,
    #[error("animation is not running")]
    NotRunning,
}

/// Presentation tuning for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatorConfig {
    /// Peak of the sinusoidal icon-size envelope.
    pub max_icon_scale: f64,
    /// Fixed rotation added to the travel heading to compensate for the
    /// marker glyph's default orientation.
    pub icon_alignment_deg: f64,
    /// Camera tuning used for every per-frame fly-to.
    pub camera: CameraOptions,
    /// Text annotated at the destination after landing, if any.
    pub destination_label: Option<String>,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            max_icon_scale: 1.0,
            icon_alignment_deg: -45.0,
            camera: CameraOptions::default(),
            destination_label: None,
        }
    }
}

/// Cursor and phase; the only mutable state of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct AnimationState {
    cursor: usize,
    phase: AnimationPhase,
}

/// Everything the surface needs to render one animation frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerFrame {
    pub cursor: usize,
    pub position: Coordinate,
    /// Travel heading plus the icon alignment offset.
    pub rotation_deg: f64,
    pub icon_scale: f64,
    /// The traversed route prefix, inclusive of the current position.
    pub trail: Vec<Coordinate>,
    pub camera: CameraOptions,
}

/// Result of one stepping call.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// More frames follow; the driver waits for the camera, then steps again.
    Advanced(MarkerFrame),
    /// The final frame; the animator has moved to `Settling`.
    Arrived(MarkerFrame),
}

impl StepOutcome {
    pub fn frame(&self) -> &MarkerFrame {
        match self {
            StepOutcome::Advanced(frame) | StepOutcome::Arrived(frame) => frame,
        }
    }
}

/// The landing effect played after the final frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LandingPlan {
    pub position: Coordinate,
    pub drop_offset_px: (f64, f64),
    pub rest_offset_px: (f64, f64),
    /// Duration of the linear offset interpolation.
    pub settle: Duration,
    pub annotation: Option<Annotation>,
}

/// A text annotation with a per-character staggered reveal.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub position: Coordinate,
    pub text: String,
    pub reveal_stagger: Duration,
}

/// Steps a single marker along a route.
#[derive(Debug, Clone, PartialEq)]
pub struct PathAnimator {
    route: Route,
    state: AnimationState,
    config: AnimatorConfig,
}

impl PathAnimator {
    pub fn new(route: Route) -> Self {
        Self::with_config(route, AnimatorConfig::default())
    }

    pub fn with_config(route: Route, config: AnimatorConfig) -> Self {
        Self {
            route,
            state: AnimationState::default(),
            config,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn config(&self) -> &AnimatorConfig {
        &self.config
    }

    pub fn phase(&self) -> AnimationPhase {
        self.state.phase
    }

    pub fn cursor(&self) -> usize {
        self.state.cursor
    }

    /// True from `start` until the run completes or is cancelled.
    pub fn is_running(&self) -> bool {
        self.state.phase != AnimationPhase::Idle
    }

    /// Begin a run (or a replay), resetting the cursor.
    ///
    /// Rejected while a run is in flight so a second start can never
    /// disturb the cursor.
    pub fn start(&mut self) -> Result<(), AnimateError> {
        if self.is_running() {
            return Err(AnimateError::AlreadyRunning);
        }
        self.state = AnimationState {
            cursor: 0,
            phase: AnimationPhase::Running,
        };
        Ok(())
    }

    /// Produce the frame at the current cursor and advance.
    ///
    /// The cursor never moves past the end of the route; the final call
    /// returns [`StepOutcome::Arrived`] and leaves the animator `Settling`.
    pub fn step(&mut self) -> Result<StepOutcome, AnimateError> {
        if self.state.phase != AnimationPhase::Running {
            return Err(AnimateError::NotRunning);
        }

        let frame = self.frame_at(self.state.cursor);
        if self.state.cursor < self.route.steps() {
            self.state.cursor += 1;
            Ok(StepOutcome::Advanced(frame))
        } else {
            self.state.phase = AnimationPhase::Settling;
            Ok(StepOutcome::Arrived(frame))
        }
    }

    /// The settle effect and annotation played once the marker has arrived.
    pub fn landing_plan(&self) -> LandingPlan {
        let position = self.route.destination();
        LandingPlan {
            position,
            drop_offset_px: LANDING_DROP_OFFSET_PX,
            rest_offset_px: LANDING_REST_OFFSET_PX,
            settle: LANDING_SETTLE,
            annotation: self.config.destination_label.clone().map(|text| Annotation {
                position,
                text,
                reveal_stagger: ANNOTATION_STAGGER,
            }),
        }
    }

    /// Finish the settle phase; no effect unless `Settling`.
    pub fn complete(&mut self) {
        if self.state.phase == AnimationPhase::Settling {
            self.state.phase = AnimationPhase::Idle;
        }
    }

    /// Abort the run. The cursor is reset by the next `start`.
    pub fn cancel(&mut self) {
        self.state.phase = AnimationPhase::Idle;
    }

    fn frame_at(&self, cursor: usize) -> MarkerFrame {
        let position = self.route.get(cursor).unwrap_or_else(|| self.route.destination());
        let progress = self.route.progress(cursor);
        MarkerFrame {
            cursor,
            position,
            rotation_deg: self.route.heading_at(cursor) + self.config.icon_alignment_deg,
            icon_scale: (self.config.max_icon_scale * (PI * progress).sin()).max(0.0),
            trail: self.route.trail(cursor).to_vec(),
            camera: self.config.camera,
        }
    }
}
