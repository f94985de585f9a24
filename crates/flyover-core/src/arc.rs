//! Arc construction between two coordinates.

use crate::geo::{bearing_deg, destination_point, haversine_distance, Coordinate, CoordinateError};
use crate::route::Route;
use std::f64::consts::PI;

/// Journeys shorter than this collapse to a single-point route.
const DEGENERATE_DISTANCE_M: f64 = 1.0;

/// Step count used when a caller does not supply one.
pub const DEFAULT_STEPS: usize = 150;
/// Curvature used when a caller does not supply one.
pub const DEFAULT_CURVATURE: f64 = 1.0;

/// Reasons an arc cannot be built from the given inputs.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ArcError {
    #[error("step count must be at least 1")]
    NoSteps,
    #[error("curvature must be finite, got {0}")]
    InvalidCurvature(f64),
    #[error("invalid origin: {0}")]
    InvalidOrigin(#[source] CoordinateError),
    #[error("invalid destination: {0}")]
    InvalidDestination(#[source] CoordinateError),
}

/// Builds curved routes between two coordinates.
///
/// Samples `steps` points along the great circle leaving the origin toward
/// the destination, then bows the path by adding a sinusoidal latitude
/// offset scaled by `curvature`: zero at both endpoints and `curvature`
/// degrees at the midpoint. The destination itself is always appended as the
/// final point, so the route lands exactly on target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcBuilder {
    steps: usize,
    curvature: f64,
}

impl Default for ArcBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_STEPS, DEFAULT_CURVATURE)
    }
}

impl ArcBuilder {
    pub fn new(steps: usize, curvature: f64) -> Self {
        Self { steps, curvature }
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn curvature(&self) -> f64 {
        self.curvature
    }

    /// Build the route from `origin` to `destination`.
    ///
    /// Returns a route of `steps + 1` points whose first element is the
    /// origin and whose last element is exactly the destination, or a
    /// single-point route when the endpoints effectively coincide.
    pub fn build(&self, origin: Coordinate, destination: Coordinate) -> Result<Route, ArcError> {
        if self.steps == 0 {
            return Err(ArcError::NoSteps);
        }
        if !self.curvature.is_finite() {
            return Err(ArcError::InvalidCurvature(self.curvature));
        }
        origin.validate().map_err(ArcError::InvalidOrigin)?;
        destination.validate().map_err(ArcError::InvalidDestination)?;

        let distance_m = haversine_distance(origin, destination);
        if distance_m < DEGENERATE_DISTANCE_M {
            return Ok(Route::single(origin));
        }

        let heading = bearing_deg(origin, destination);
        let mut points = Vec::with_capacity(self.steps + 1);
        points.push(origin);
        for i in 1..self.steps {
            let fraction = i as f64 / self.steps as f64;
            let mut point = destination_point(origin, distance_m * fraction, heading);
            point.lat += self.curvature * (PI * fraction).sin();
            points.push(point);
        }
        // The sample loop stops one stride short; the exact destination goes
        // in its place so the final frame lands on target.
        points.push(destination);

        Ok(Route::from_points(points, distance_m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAN_FRANCISCO: Coordinate = Coordinate {
        lon: -122.414,
        lat: 37.776,
    };
    const TEXAS: Coordinate = Coordinate {
        lon: -96.171851,
        lat: 31.829513,
    };

    #[test]
    fn route_has_steps_plus_one_points_with_exact_endpoints() {
        for steps in [1, 2, 10, 150] {
            let route = ArcBuilder::new(steps, 0.5).build(SAN_FRANCISCO, TEXAS).unwrap();
            assert_eq!(route.len(), steps + 1, "steps = {steps}");
            assert_eq!(route.origin(), SAN_FRANCISCO);
            assert_eq!(route.destination(), TEXAS);
        }
    }

    #[test]
    fn zero_curvature_matches_the_straight_interpolation() {
        let route = ArcBuilder::new(100, 0.0).build(SAN_FRANCISCO, TEXAS).unwrap();
        let distance = haversine_distance(SAN_FRANCISCO, TEXAS);
        let heading = bearing_deg(SAN_FRANCISCO, TEXAS);

        for (i, point) in route.points().iter().enumerate().take(100) {
            let fraction = i as f64 / 100.0;
            let straight = destination_point(SAN_FRANCISCO, distance * fraction, heading);
            assert!(
                (point.lat - straight.lat).abs() < 1e-9,
                "sample {i} drifted off the straight line"
            );
        }
    }

    #[test]
    fn midpoint_offset_equals_the_curvature() {
        let curvature = 2.5;
        let route = ArcBuilder::new(100, curvature).build(SAN_FRANCISCO, TEXAS).unwrap();
        let distance = haversine_distance(SAN_FRANCISCO, TEXAS);
        let heading = bearing_deg(SAN_FRANCISCO, TEXAS);

        let straight_mid = destination_point(SAN_FRANCISCO, distance * 0.5, heading);
        let arc_mid = route.get(50).unwrap();
        assert!((arc_mid.lat - straight_mid.lat - curvature).abs() < 1e-9);
    }

    #[test]
    fn san_francisco_to_texas_demo_arc() {
        // The canonical demo flight: 150 steps, curvature 1.
        let route = ArcBuilder::new(150, 1.0).build(SAN_FRANCISCO, TEXAS).unwrap();
        assert_eq!(route.len(), 151);
        assert_eq!(route.origin(), SAN_FRANCISCO);
        assert_eq!(route.destination(), TEXAS);

        let distance = haversine_distance(SAN_FRANCISCO, TEXAS);
        let heading = bearing_deg(SAN_FRANCISCO, TEXAS);
        let straight_mid = destination_point(SAN_FRANCISCO, distance * 0.5, heading);
        let offset = route.get(75).unwrap().lat - straight_mid.lat;
        assert!((offset - 1.0).abs() < 1e-9, "midpoint offset was {offset}");
    }

    #[test]
    fn traversed_distance_grows_monotonically() {
        let route = ArcBuilder::new(40, 0.0).build(SAN_FRANCISCO, TEXAS).unwrap();
        let mut previous = -1.0;
        for point in route.points() {
            let travelled = haversine_distance(SAN_FRANCISCO, *point);
            assert!(travelled > previous - 1e-6);
            previous = travelled;
        }
    }

    #[test]
    fn coincident_endpoints_collapse_to_a_single_point() {
        let route = ArcBuilder::new(150, 1.0).build(SAN_FRANCISCO, SAN_FRANCISCO).unwrap();
        assert_eq!(route.len(), 1);
        assert_eq!(route.steps(), 0);
        assert_eq!(route.origin(), SAN_FRANCISCO);
    }

    #[test]
    fn invalid_inputs_fail_fast() {
        assert_eq!(
            ArcBuilder::new(0, 1.0).build(SAN_FRANCISCO, TEXAS),
            Err(ArcError::NoSteps)
        );
        assert!(matches!(
            ArcBuilder::new(10, f64::NAN).build(SAN_FRANCISCO, TEXAS),
            Err(ArcError::InvalidCurvature(_))
        ));
        assert!(matches!(
            ArcBuilder::new(10, 1.0).build(Coordinate::new(-200.0, 0.0), TEXAS),
            Err(ArcError::InvalidOrigin(_))
        ));
        assert!(matches!(
            ArcBuilder::new(10, 1.0).build(SAN_FRANCISCO, Coordinate::new(0.0, 95.0)),
            Err(ArcError::InvalidDestination(_))
        ));
    }
}
