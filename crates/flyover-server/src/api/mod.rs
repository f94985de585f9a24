//! HTTP and WebSocket API for the flyover server.

mod routes;
pub mod ws;

use crate::state::AppState;
use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    routes::create_router()
}
