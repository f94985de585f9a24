//! Frame streaming onto the broadcast bus.
//!
//! Every surface command a server-side run produces is serialized once into
//! a frame envelope and fanned out to WebSocket subscribers. Payloads ride in
//! an `Arc<String>` so fan-out never re-serializes.

use chrono::Utc;
use flyover_core::geo::Coordinate;
use flyover_core::surface::{AnnotationOptions, CameraOptions, SurfaceCommand};
use flyover_player::{CameraTransit, MapSurface, SurfaceError};
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// One serialized surface command, tagged for per-flight filtering.
#[derive(Debug, Clone)]
pub struct FrameEnvelope {
    pub flight_id: String,
    pub payload: Arc<String>,
}

/// A [`MapSurface`] that serializes commands onto the frame bus.
///
/// The camera settles after a fixed delay, standing in for the eased
/// transition a browser map would run; that delay is what paces server-side
/// playback.
pub struct BroadcastSurface {
    flight_id: String,
    bus: broadcast::Sender<FrameEnvelope>,
    camera_settle: Duration,
    seq: AtomicU64,
    torn_down: AtomicBool,
}

impl BroadcastSurface {
    pub fn new(
        flight_id: String,
        bus: broadcast::Sender<FrameEnvelope>,
        camera_settle: Duration,
    ) -> Self {
        Self {
            flight_id,
            bus,
            camera_settle,
            seq: AtomicU64::new(0),
            torn_down: AtomicBool::new(false),
        }
    }

    /// Tell consumers to drop whatever scene they still render, without
    /// closing this surface. Sent before a replay re-stages.
    pub fn clear_scene(&self) {
        self.publish(&SurfaceCommand::Teardown);
    }

    fn publish(&self, command: &SurfaceCommand) {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        let frame = json!({
            "flight_id": self.flight_id,
            "seq": seq,
            "at": Utc::now().to_rfc3339(),
            "command": command,
        });
        // No subscribers is fine; the bus just drops the frame.
        let _ = self.bus.send(FrameEnvelope {
            flight_id: self.flight_id.clone(),
            payload: Arc::new(frame.to_string()),
        });
    }

    fn send(&self, command: SurfaceCommand) -> Result<(), SurfaceError> {
        if self.torn_down.load(Ordering::SeqCst) {
            return Err(SurfaceError::TornDown);
        }
        self.publish(&command);
        Ok(())
    }
}

impl MapSurface for BroadcastSurface {
    fn set_marker_position(&self, marker: &str, position: Coordinate) -> Result<(), SurfaceError> {
        self.send(SurfaceCommand::SetMarkerPosition {
            marker: marker.to_string(),
            position,
        })
    }

    fn set_marker_rotation(&self, marker: &str, degrees: f64) -> Result<(), SurfaceError> {
        self.send(SurfaceCommand::SetMarkerRotation {
            marker: marker.to_string(),
            degrees,
        })
    }

    fn set_marker_scale(&self, marker: &str, scale: f64) -> Result<(), SurfaceError> {
        self.send(SurfaceCommand::SetMarkerScale {
            marker: marker.to_string(),
            scale,
        })
    }

    fn set_marker_offset(&self, marker: &str, offset_px: (f64, f64)) -> Result<(), SurfaceError> {
        self.send(SurfaceCommand::SetMarkerOffset {
            marker: marker.to_string(),
            offset_px,
        })
    }

    fn set_line_geometry(&self, line: &str, points: &[Coordinate]) -> Result<(), SurfaceError> {
        self.send(SurfaceCommand::SetLineGeometry {
            line: line.to_string(),
            points: points.to_vec(),
        })
    }

    fn fly_camera_to(
        &self,
        center: Coordinate,
        options: CameraOptions,
    ) -> Result<CameraTransit, SurfaceError> {
        self.send(SurfaceCommand::FlyCameraTo { center, options })?;
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
        options: AnnotationOptions,
    ) -> Result<(), SurfaceError> {
        self.send(SurfaceCommand::AddAnnotation {
            position,
            text: text.to_string(),
            options,
        })
    }

    fn teardown(&self) {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }
        self.publish(&SurfaceCommand::Teardown);
    }
}
