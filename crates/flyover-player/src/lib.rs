//! Flyover player - async driver for path animations.
//!
//! Connects a `flyover_core` animator to a rendering backend through the
//! [`MapSurface`] trait and owns all run timing.

pub mod player;
pub mod recording;
pub mod simulated;
pub mod surface;

pub use player::{PlayOutcome, PlayReport, Player, PlayerError, PlayerSettings};
pub use recording::{CameraControl, RecordingSurface};
pub use simulated::{MarkerState, SimulatedSurface};
pub use surface::{CameraTransit, MapSurface, SurfaceError};
