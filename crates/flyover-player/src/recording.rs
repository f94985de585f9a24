//! A surface that records every command it receives.
//!
//! Useful for headless runs and for asserting on the exact command stream a
//! player produced. The optional manual camera control holds every camera
//! completion signal until the holder releases it, which pins down the
//! player's step/camera interleaving.

use crate::surface::{CameraTransit, MapSurface, SurfaceError};
use flyover_core::geo::Coordinate;
use flyover_core::surface::{AnnotationOptions, CameraOptions, SurfaceCommand};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// Releases recorded camera moves one at a time.
#[derive(Debug, Clone, Default)]
pub struct CameraControl {
    queued: Arc<Mutex<VecDeque<oneshot::Sender<()>>>>,
}

impl CameraControl {
    /// Number of camera moves waiting on a release.
    pub fn in_transit(&self) -> usize {
        self.queued.lock().map(|q| q.len()).unwrap_or(0)
    }

    /// Settle the oldest waiting camera move. Returns false if none waited.
    pub fn release_next(&self) -> bool {
        let released = match self.queued.lock() {
            Ok(mut queued) => queued.pop_front(),
            Err(_) => None,
        };
        match released {
            Some(settled) => {
                let _ = settled.send(());
                true
            }
            None => false,
        }
    }

    fn hold(&self, settled: oneshot::Sender<()>) {
        if let Ok(mut queued) = self.queued.lock() {
            queued.push_back(settled);
        }
    }
}

/// A [`MapSurface`] that appends every command to a shared log.
///
/// Clones share the log, so callers keep one handle for assertions while the
/// player owns another. Cameras settle instantly unless the surface was built
/// with a manual control.
#[derive(Clone, Default)]
pub struct RecordingSurface {
    log: Arc<Mutex<Vec<SurfaceCommand>>>,
    camera: Option<CameraControl>,
    torn_down: Arc<AtomicBool>,
}

impl RecordingSurface {
    /// A recording surface whose cameras settle instantly.
    pub fn new() -> Self {
        Self::default()
    }

    /// A recording surface whose cameras wait on the returned control.
    pub fn with_manual_camera() -> (Self, CameraControl) {
        let control = CameraControl::default();
        let surface = Self {
            camera: Some(control.clone()),
            ..Self::default()
        };
        (surface, control)
    }

    /// Snapshot of every command recorded so far, in receipt order.
    pub fn commands(&self) -> Vec<SurfaceCommand> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Positions a given marker was moved to, in receipt order.
    pub fn positions_of(&self, marker: &str) -> Vec<Coordinate> {
        self.commands()
            .into_iter()
            .filter_map(|command| match command {
                SurfaceCommand::SetMarkerPosition { marker: id, position } if id == marker => {
                    Some(position)
                }
                _ => None,
            })
            .collect()
    }

    /// Offsets a given marker was shifted to, in receipt order.
    pub fn offsets_of(&self, marker: &str) -> Vec<(f64, f64)> {
        self.commands()
            .into_iter()
            .filter_map(|command| match command {
                SurfaceCommand::SetMarkerOffset { marker: id, offset_px } if id == marker => {
                    Some(offset_px)
                }
                _ => None,
            })
            .collect()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }

    fn record(&self, command: SurfaceCommand) -> Result<(), SurfaceError> {
        if self.is_torn_down() {
            return Err(SurfaceError::TornDown);
        }
        if let Ok(mut log) = self.log.lock() {
            log.push(command);
        }
        Ok(())
    }
}

impl MapSurface for RecordingSurface {
    fn set_marker_position(&self, marker: &str, position: Coordinate) -> Result<(), SurfaceError> {
        self.record(SurfaceCommand::SetMarkerPosition {
            marker: marker.to_string(),
            position,
        })
    }

    fn set_marker_rotation(&self, marker: &str, degrees: f64) -> Result<(), SurfaceError> {
        self.record(SurfaceCommand::SetMarkerRotation {
            marker: marker.to_string(),
            degrees,
        })
    }

    fn set_marker_scale(&self, marker: &str, scale: f64) -> Result<(), SurfaceError> {
        self.record(SurfaceCommand::SetMarkerScale {
            marker: marker.to_string(),
            scale,
        })
    }

    fn set_marker_offset(&self, marker: &str, offset_px: (f64, f64)) -> Result<(), SurfaceError> {
        self.record(SurfaceCommand::SetMarkerOffset {
            marker: marker.to_string(),
            offset_px,
        })
    }

    fn set_line_geometry(&self, line: &str, points: &[Coordinate]) -> Result<(), SurfaceError> {
        self.record(SurfaceCommand::SetLineGeometry {
            line: line.to_string(),
            points: points.to_vec(),
        })
    }

    fn fly_camera_to(
        &self,
        center: Coordinate,
        options: CameraOptions,
    ) -> Result<CameraTransit, SurfaceError> {
        self.record(SurfaceCommand::FlyCameraTo { center, options })?;
        match &self.camera {
            Some(control) => {
                let (settled, transit) = CameraTransit::pending();
                control.hold(settled);
                Ok(transit)
            }
            None => Ok(CameraTransit::settled()),
        }
    }

    fn add_annotation(
        &self,
        position: Coordinate,
        text: &str,
        options: AnnotationOptions,
    ) -> Result<(), SurfaceError> {
        self.record(SurfaceCommand::AddAnnotation {
            position,
            text: text.to_string(),
            options,
        })
    }

    fn teardown(&self) {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Ok(mut log) = self.log.lock() {
            log.push(SurfaceCommand::Teardown);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_commands_in_order_and_rejects_after_teardown() {
        let surface = RecordingSurface::new();
        let at = Coordinate::new(-122.414, 37.776);

        surface.set_marker_position("aircraft", at).unwrap();
        surface.set_marker_rotation("aircraft", 90.0).unwrap();
        surface.fly_camera_to(at, CameraOptions::default()).unwrap().wait().await;

        surface.teardown();
        surface.teardown();

        assert_eq!(
            surface.set_marker_position("aircraft", at),
            Err(SurfaceError::TornDown)
        );

        let commands = surface.commands();
        assert_eq!(commands.len(), 4);
        assert!(matches!(commands[0], SurfaceCommand::SetMarkerPosition { .. }));
        assert!(matches!(commands[3], SurfaceCommand::Teardown));
    }

    #[tokio::test]
    async fn manual_camera_holds_transits_until_released() {
        let (surface, control) = RecordingSurface::with_manual_camera();
        let transit = surface
            .fly_camera_to(Coordinate::new(0.0, 0.0), CameraOptions::default())
            .unwrap();

        assert_eq!(control.in_transit(), 1);
        assert!(control.release_next());
        transit.wait().await;
        assert!(!control.release_next());
    }
}
