pub mod animator;
pub mod arc;
pub mod geo;
pub mod geojson;
pub mod route;
pub mod surface;

pub use animator::{
    AnimateError, AnimationPhase, Annotation, AnimatorConfig, LandingPlan, MarkerFrame,
    PathAnimator, StepOutcome,
};
pub use arc::{ArcBuilder, ArcError, DEFAULT_CURVATURE, DEFAULT_STEPS};
pub use geo::{
    bearing_deg, destination_point, haversine_distance, Coordinate, CoordinateError,
    EARTH_RADIUS_M,
};
pub use route::Route;
pub use surface::{
    AnnotationOptions, CameraOptions, Easing, SurfaceCommand, AIRCRAFT_MARKER, DESTINATION_MARKER,
    LANDING_MARKER, ORIGIN_MARKER, ROUTE_LINE, TRAIL_LINE,
};
