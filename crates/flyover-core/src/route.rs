//! Immutable routes and the per-cursor values derived from them.

use crate::geo::{bearing_deg, Coordinate};

/// An ordered coordinate sequence from origin to destination.
///
/// Built once per animation run and never mutated afterwards; the animation
/// cursor only reads it by index. Always holds at least one point.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    points: Vec<Coordinate>,
    distance_m: f64,
}

impl Route {
    pub(crate) fn from_points(points: Vec<Coordinate>, distance_m: f64) -> Self {
        debug_assert!(!points.is_empty(), "a route holds at least one point");
        Self { points, distance_m }
    }

    /// Degenerate route for a journey whose endpoints coincide.
    ///
    /// Callers treat this as an immediate-completion case, not an error.
    pub fn single(at: Coordinate) -> Self {
        Self {
            points: vec![at],
            distance_m: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of cursor advances in a full traversal (`len() - 1`).
    pub fn steps(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn get(&self, index: usize) -> Option<Coordinate> {
        self.points.get(index).copied()
    }

    pub fn origin(&self) -> Coordinate {
        self.points[0]
    }

    pub fn destination(&self) -> Coordinate {
        self.points[self.points.len() - 1]
    }

    /// Great-circle distance between the endpoints, in meters.
    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }

    /// Heading of travel at a cursor position, in degrees [0, 360).
    ///
    /// Normally the bearing from the cursor point to the next one; at the
    /// final index the pair degrades to (previous, current) so the heading
    /// keeps pointing in the direction of travel.
    pub fn heading_at(&self, cursor: usize) -> f64 {
        let last = self.steps();
        let cursor = cursor.min(last);
        let (from, to) = if cursor == last {
            (cursor.saturating_sub(1), cursor)
        } else {
            (cursor, cursor + 1)
        };
        bearing_deg(self.points[from], self.points[to])
    }

    /// The already-traversed prefix, inclusive of the cursor point.
    pub fn trail(&self, cursor: usize) -> &[Coordinate] {
        &self.points[..=cursor.min(self.steps())]
    }

    /// Normalized progress in [0, 1]; a single-point route is complete.
    pub fn progress(&self, cursor: usize) -> f64 {
        let steps = self.steps();
        if steps == 0 {
            return 1.0;
        }
        cursor.min(steps) as f64 / steps as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arc::ArcBuilder;

    fn sample_route() -> Route {
        ArcBuilder::new(10, 0.0)
            .build(Coordinate::new(-122.414, 37.776), Coordinate::new(-96.17, 31.83))
            .unwrap()
    }

    #[test]
    fn trail_is_a_prefix_through_the_cursor() {
        let route = sample_route();
        let trail = route.trail(4);
        assert_eq!(trail.len(), 5);
        assert_eq!(trail, &route.points()[..5]);
        assert_eq!(route.trail(0), &[route.origin()]);
    }

    #[test]
    fn trail_saturates_at_the_route_end() {
        let route = sample_route();
        assert_eq!(route.trail(999).len(), route.len());
    }

    #[test]
    fn heading_at_the_final_index_keeps_the_direction_of_travel() {
        let route = sample_route();
        let last = route.steps();
        // The boundary pair degrades to (previous, current), which is the
        // same segment the second-to-last cursor uses.
        assert_eq!(route.heading_at(last), route.heading_at(last - 1));
    }

    #[test]
    fn progress_spans_zero_to_one() {
        let route = sample_route();
        assert_eq!(route.progress(0), 0.0);
        assert_eq!(route.progress(route.steps()), 1.0);
        assert!((route.progress(5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn single_point_route_is_safe_to_query() {
        let route = Route::single(Coordinate::new(1.0, 2.0));
        assert_eq!(route.len(), 1);
        assert_eq!(route.steps(), 0);
        assert_eq!(route.progress(0), 1.0);
        assert_eq!(route.trail(0).len(), 1);
        assert_eq!(route.heading_at(0), 0.0);
    }
}
