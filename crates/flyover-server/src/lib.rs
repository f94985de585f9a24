//! Shared library surface for the flyover server and its tests.

pub mod api;
pub mod config;
pub mod loops;
pub mod runner;
pub mod state;
pub mod stream;
