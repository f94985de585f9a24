//! Server configuration from environment.

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    /// How long the simulated camera takes to settle after each fly-to.
    pub camera_settle_ms: u64,
    /// Watchdog bound on any single camera wait.
    pub camera_watchdog_s: u64,
    /// How long finished flights stay queryable.
    pub flight_ttl_s: i64,
    pub cleanup_interval_s: u64,
    pub max_active_flights: usize,
    pub default_steps: usize,
    pub default_curvature: f64,
    /// Capacity of the frame broadcast bus.
    pub frame_buffer: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("FLYOVER_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(4000),
            camera_settle_ms: env::var("FLYOVER_CAMERA_SETTLE_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(120),
            camera_watchdog_s: env::var("FLYOVER_CAMERA_WATCHDOG_S")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            flight_ttl_s: env::var("FLYOVER_FLIGHT_TTL_S")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(900),
            cleanup_interval_s: env::var("FLYOVER_CLEANUP_INTERVAL_S")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
            max_active_flights: env::var("FLYOVER_MAX_ACTIVE_FLIGHTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(32),
            default_steps: env::var("FLYOVER_DEFAULT_STEPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(150),
            default_curvature: env::var("FLYOVER_DEFAULT_CURVATURE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1.0),
            frame_buffer: env::var("FLYOVER_FRAME_BUFFER")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(256),
        }
    }
}
