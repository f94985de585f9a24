//! Flyover CLI - command line tools for the flyover animation system.
//!
//! This crate provides three binaries:
//! - demo_flight: play the arc animation against a console map surface
//! - export_arc: emit an arc route as GeoJSON
//! - watch_flights: stream animation frames from a running server

pub mod coords;

pub use coords::parse_lon_lat;
