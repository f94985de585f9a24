//! Wire vocabulary for map-surface updates.
//!
//! Every visual side effect of an animation run is expressed as a
//! [`SurfaceCommand`], so frames can be logged, replayed, or streamed to a
//! remote renderer unchanged.

use crate::geo::Coordinate;
use serde::{Deserialize, Serialize};

/// Marker id of the animated aircraft icon.
pub const AIRCRAFT_MARKER: &str = "aircraft";
/// Marker id of the static origin pin.
pub const ORIGIN_MARKER: &str = "origin";
/// Marker id of the static destination pin.
pub const DESTINATION_MARKER: &str = "destination";
/// Marker id of the landing pin dropped on arrival.
pub const LANDING_MARKER: &str = "landing";
/// Line id of the full route geometry, drawn once during staging.
pub const ROUTE_LINE: &str = "route";
/// Line id of the growing trail behind the aircraft.
pub const TRAIL_LINE: &str = "trail";

/// Easing curve applied to a time-based transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    /// Map linear progress `t` in [0, 1] onto the eased curve.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    (4.0 - 2.0 * t) * t - 1.0
                }
            }
        }
    }
}

/// Camera-flight tuning, mirroring the usual map-library fly-to knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraOptions {
    /// Average flight speed, in screen-fuls per second.
    pub speed: f64,
    /// Zoom-out factor of the flight path.
    pub curve: f64,
    pub easing: Easing,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            speed: 0.5,
            curve: 1.0,
            easing: Easing::Linear,
        }
    }
}

/// Presentation options for a text annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationOptions {
    /// Per-character reveal delay in milliseconds.
    pub reveal_stagger_ms: u64,
}

impl Default for AnnotationOptions {
    fn default() -> Self {
        Self {
            reveal_stagger_ms: 100,
        }
    }
}

/// One update applied to the map surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SurfaceCommand {
    /// Position a marker, creating it on first use.
    SetMarkerPosition {
        marker: String,
        position: Coordinate,
    },
    /// Rotate a marker's icon, in degrees clockwise from its default glyph
    /// orientation.
    SetMarkerRotation { marker: String, degrees: f64 },
    /// Scale a marker's icon relative to its natural size.
    SetMarkerScale { marker: String, scale: f64 },
    /// Shift a marker away from its anchor by screen pixels.
    SetMarkerOffset { marker: String, offset_px: (f64, f64) },
    /// Replace a line's geometry wholesale.
    SetLineGeometry {
        line: String,
        points: Vec<Coordinate>,
    },
    /// Recenter the camera with an eased flight.
    FlyCameraTo {
        center: Coordinate,
        options: CameraOptions,
    },
    /// Attach a text annotation at a coordinate.
    AddAnnotation {
        position: Coordinate,
        text: String,
        options: AnnotationOptions,
    },
    /// The hosting context is going away; drop everything.
    Teardown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn commands_serialize_with_a_type_tag() {
        let command = SurfaceCommand::SetMarkerPosition {
            marker: AIRCRAFT_MARKER.to_string(),
            position: Coordinate::new(-122.414, 37.776),
        };
        let value = serde_json::to_value(&command).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "SET_MARKER_POSITION",
                "marker": "aircraft",
                "position": { "lon": -122.414, "lat": 37.776 },
            })
        );
    }

    #[test]
    fn marker_offsets_serialize_as_pixel_pairs() {
        let command = SurfaceCommand::SetMarkerOffset {
            marker: LANDING_MARKER.to_string(),
            offset_px: (0.0, -50.0),
        };
        let value = serde_json::to_value(&command).unwrap();
        assert_eq!(value["offset_px"], json!([0.0, -50.0]));
    }

    #[test]
    fn easing_curves_hit_their_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::EaseIn,
            Easing::EaseOut,
            Easing::EaseInOut,
        ] {
            assert_eq!(easing.apply(0.0), 0.0, "{easing:?} at 0");
            assert_eq!(easing.apply(1.0), 1.0, "{easing:?} at 1");
            assert_eq!(easing.apply(-2.0), 0.0, "{easing:?} clamps below");
            assert_eq!(easing.apply(2.0), 1.0, "{easing:?} clamps above");
        }
    }

    #[test]
    fn ease_out_front_loads_progress() {
        assert!(Easing::EaseOut.apply(0.25) > 0.25);
        assert!(Easing::EaseIn.apply(0.25) < 0.25);
    }
}
