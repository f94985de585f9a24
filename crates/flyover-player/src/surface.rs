//! The map surface port the player drives.
//!
//! Rendering backends implement [`MapSurface`]; the player only ever talks
//! through this trait. Camera moves are the one asynchronous operation: the
//! adapter hands back a [`CameraTransit`] and resolves it whenever its camera
//! has settled.

use flyover_core::geo::Coordinate;
use flyover_core::surface::{AnnotationOptions, CameraOptions};
use std::time::Duration;
use tokio::sync::oneshot;

/// Surface calls fail only once the surface is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    #[error("map surface has been torn down")]
    TornDown,
}

/// A rendering backend for one animation scene.
///
/// Markers and lines are addressed by string id and created on first use.
/// Implementations must be safe to call from the player task while test or
/// host code holds another handle.
pub trait MapSurface: Send + Sync {
    /// Move a marker, creating it on first use.
    fn set_marker_position(&self, marker: &str, position: Coordinate) -> Result<(), SurfaceError>;

    /// Rotate a marker's icon, in degrees clockwise from north.
    fn set_marker_rotation(&self, marker: &str, degrees: f64) -> Result<(), SurfaceError>;

    /// Scale a marker's icon.
    fn set_marker_scale(&self, marker: &str, scale: f64) -> Result<(), SurfaceError>;

    /// Shift a marker away from its anchor by whole-screen pixels.
    fn set_marker_offset(&self, marker: &str, offset_px: (f64, f64)) -> Result<(), SurfaceError>;

    /// Replace a line's geometry, creating the line on first use.
    fn set_line_geometry(&self, line: &str, points: &[Coordinate]) -> Result<(), SurfaceError>;

    /// Begin an eased camera move and return its completion signal.
    fn fly_camera_to(
        &self,
        center: Coordinate,
        options: CameraOptions,
    ) -> Result<CameraTransit, SurfaceError>;

    /// Attach a text annotation to a coordinate.
    fn add_annotation(
        &self,
        position: Coordinate,
        text: &str,
        options: AnnotationOptions,
    ) -> Result<(), SurfaceError>;

    /// Drop the scene. Idempotent; every later call reports
    /// [`SurfaceError::TornDown`].
    fn teardown(&self);
}

/// Completion signal for one in-flight camera move.
///
/// Resolves when the adapter reports the camera settled. An adapter that is
/// dropped mid-move resolves the transit rather than wedging the player; the
/// player's watchdog covers adapters that keep the signal alive but never
/// fire it.
#[derive(Debug)]
pub struct CameraTransit {
    settled: oneshot::Receiver<()>,
}

impl CameraTransit {
    /// A transit that is already settled. For adapters with no camera timing.
    pub fn settled() -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(());
        Self { settled: rx }
    }

    /// A transit that settles after a fixed delay on the current runtime.
    pub fn settle_after(delay: Duration) -> Self {
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(());
        });
        Self { settled: rx }
    }

    /// A transit paired with the sender that settles it.
    pub fn pending() -> (oneshot::Sender<()>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { settled: rx })
    }

    /// Wait for the camera to settle (or for the adapter to go away).
    pub async fn wait(self) {
        let _ = self.settled.await;
    }
}
