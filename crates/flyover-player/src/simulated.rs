//! An in-memory surface with time-based camera settling.
//!
//! Holds the scene a real map would render so a run's end state can be
//! inspected. Camera moves settle after a fixed delay, which gives headless
//! runs the same pacing a real eased camera imposes.

use crate::surface::{CameraTransit, MapSurface, SurfaceError};
use flyover_core::geo::Coordinate;
use flyover_core::surface::{AnnotationOptions, CameraOptions};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Rendered state of one marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerState {
    pub position: Coordinate,
    pub rotation_deg: f64,
    pub scale: f64,
    pub offset_px: (f64, f64),
}

impl MarkerState {
    fn at(position: Coordinate) -> Self {
        Self {
            position,
            rotation_deg: 0.0,
            scale: 1.0,
            offset_px: (0.0, 0.0),
        }
    }
}

#[derive(Default)]
struct Scene {
    markers: Mutex<HashMap<String, MarkerState>>,
    lines: Mutex<HashMap<String, Vec<Coordinate>>>,
    annotations: Mutex<Vec<(Coordinate, String)>>,
    camera_center: Mutex<Option<Coordinate>>,
    torn_down: AtomicBool,
}

/// A [`MapSurface`] that renders into memory.
///
/// Clones share the scene. Markers spring into existence on their first
/// position update, matching how real map backends create on first use.
#[derive(Clone)]
pub struct SimulatedSurface {
    scene: Arc<Scene>,
    camera_settle: Duration,
}

impl SimulatedSurface {
    /// A surface whose cameras settle after `camera_settle`.
    pub fn new(camera_settle: Duration) -> Self {
        Self {
            scene: Arc::new(Scene::default()),
            camera_settle,
        }
    }

    pub fn marker(&self, id: &str) -> Option<MarkerState> {
        self.scene
            .markers
            .lock()
            .ok()
            .and_then(|markers| markers.get(id).cloned())
    }

    pub fn line(&self, id: &str) -> Option<Vec<Coordinate>> {
        self.scene
            .lines
            .lock()
            .ok()
            .and_then(|lines| lines.get(id).cloned())
    }

    pub fn annotations(&self) -> Vec<(Coordinate, String)> {
        self.scene
            .annotations
            .lock()
            .map(|a| a.clone())
            .unwrap_or_default()
    }

    pub fn camera_center(&self) -> Option<Coordinate> {
        self.scene.camera_center.lock().ok().and_then(|c| *c)
    }

    pub fn is_torn_down(&self) -> bool {
        self.scene.torn_down.load(Ordering::SeqCst)
    }

    fn live(&self) -> Result<(), SurfaceError> {
        if self.is_torn_down() {
            return Err(SurfaceError::TornDown);
        }
        Ok(())
    }

    fn update_marker(
        &self,
        marker: &str,
        position: Option<Coordinate>,
        apply: impl FnOnce(&mut MarkerState),
    ) -> Result<(), SurfaceError> {
        self.live()?;
        if let Ok(mut markers) = self.scene.markers.lock() {
            match markers.get_mut(marker) {
                Some(state) => {
                    if let Some(position) = position {
                        state.position = position;
                    }
                    apply(state);
                }
                // Everything except a position update is dropped until the
                // marker exists, as on a real map.
                None => {
                    if let Some(position) = position {
                        let mut state = MarkerState::at(position);
                        apply(&mut state);
                        markers.insert(marker.to_string(), state);
                    }
                }
            }
        }
        Ok(())
    }
}

impl MapSurface for SimulatedSurface {
    fn set_marker_position(&self, marker: &str, position: Coordinate) -> Result<(), SurfaceError> {
        self.update_marker(marker, Some(position), |_| {})
    }

    fn set_marker_rotation(&self, marker: &str, degrees: f64) -> Result<(), SurfaceError> {
        self.update_marker(marker, None, |state| state.rotation_deg = degrees)
    }

    fn set_marker_scale(&self, marker: &str, scale: f64) -> Result<(), SurfaceError> {
        self.update_marker(marker, None, |state| state.scale = scale)
    }

    fn set_marker_offset(&self, marker: &str, offset_px: (f64, f64)) -> Result<(), SurfaceError> {
        self.update_marker(marker, None, |state| state.offset_px = offset_px)
    }

    fn set_line_geometry(&self, line: &str, points: &[Coordinate]) -> Result<(), SurfaceError> {
        self.live()?;
        if let Ok(mut lines) = self.scene.lines.lock() {
            lines.insert(line.to_string(), points.to_vec());
        }
        Ok(())
    }

    fn fly_camera_to(
        &self,
        center: Coordinate,
        _options: CameraOptions,
    ) -> Result<CameraTransit, SurfaceError> {
        self.live()?;
        if let Ok(mut camera) = self.scene.camera_center.lock() {
            *camera = Some(center);
        }
        if self.camera_settle.is_zero() {
            Ok(CameraTransit::settled())
        } else {
            Ok(CameraTransit::settle_after(self.camera_settle))
        }
    }

    fn add_annotation(
        &self,
        position: Coordinate,
        text: &str,
        _options: AnnotationOptions,
    ) -> Result<(), SurfaceError> {
        self.live()?;
        if let Ok(mut annotations) = self.scene.annotations.lock() {
            annotations.push((position, text.to_string()));
        }
        Ok(())
    }

    fn teardown(&self) {
        if self.scene.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Ok(mut markers) = self.scene.markers.lock() {
            markers.clear();
        }
        if let Ok(mut lines) = self.scene.lines.lock() {
            lines.clear();
        }
        if let Ok(mut annotations) = self.scene.annotations.lock() {
            annotations.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn markers_are_created_on_first_position_update() {
        let surface = SimulatedSurface::new(Duration::ZERO);
        let at = Coordinate::new(3.0, 4.0);

        // No marker yet, so rotation has nothing to land on.
        surface.set_marker_rotation("aircraft", 45.0).unwrap();
        assert!(surface.marker("aircraft").is_none());

        surface.set_marker_position("aircraft", at).unwrap();
        surface.set_marker_rotation("aircraft", 45.0).unwrap();
        surface.set_marker_scale("aircraft", 0.5).unwrap();

        let marker = surface.marker("aircraft").unwrap();
        assert_eq!(marker.position, at);
        assert_eq!(marker.rotation_deg, 45.0);
        assert_eq!(marker.scale, 0.5);
    }

    #[tokio::test]
    async fn teardown_clears_the_scene_and_blocks_updates() {
        let surface = SimulatedSurface::new(Duration::ZERO);
        let at = Coordinate::new(0.0, 0.0);
        surface.set_marker_position("aircraft", at).unwrap();
        surface.set_line_geometry("trail", &[at]).unwrap();

        surface.teardown();
        assert!(surface.is_torn_down());
        assert!(surface.marker("aircraft").is_none());
        assert!(surface.line("trail").is_none());
        assert_eq!(
            surface.set_marker_position("aircraft", at),
            Err(SurfaceError::TornDown)
        );
    }
}
