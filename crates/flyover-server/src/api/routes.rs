use crate::runner;
use crate::state::{AppState, FlightStatus, ReplayRefusal};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use flyover_core::arc::ArcBuilder;
use flyover_core::geo::Coordinate;
use flyover_core::geojson;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/v1/flights", post(create_flight).get(list_flights))
        .route("/v1/flights/:flight_id", get(get_flight))
        .route("/v1/flights/:flight_id/geojson", get(flight_geojson))
        .route("/v1/flights/:flight_id/cancel", post(cancel_flight))
        .route("/v1/flights/:flight_id/replay", post(replay_flight))
}

#[derive(Debug, Deserialize)]
struct CreateFlightRequest {
    origin: Coordinate,
    destination: Coordinate,
    steps: Option<usize>,
    curvature: Option<f64>,
    label: Option<String>,
}

async fn create_flight(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateFlightRequest>,
) -> impl IntoResponse {
    let steps = payload.steps.unwrap_or(state.config().default_steps);
    let curvature = payload.curvature.unwrap_or(state.config().default_curvature);

    let route = match ArcBuilder::new(steps, curvature).build(payload.origin, payload.destination)
    {
        Ok(route) => route,
        Err(error) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response();
        }
    };

    if state.active_flights() >= state.config().max_active_flights {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "too many active flights" })),
        )
            .into_response();
    }

    let plan = state.register_flight(
        payload.origin,
        payload.destination,
        steps,
        curvature,
        payload.label,
        route,
    );
    let flight_id = plan.flight_id.clone();
    let points = plan.route.len();
    runner::spawn_flight(state, plan);

    tracing::info!("flight {} launched with {} route points", flight_id, points);
    (
        StatusCode::CREATED,
        Json(json!({
            "flight_id": flight_id,
            "points": points,
            "status": FlightStatus::Running,
        })),
    )
        .into_response()
}

async fn list_flights(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.get_all_flights())
}

async fn get_flight(
    State(state): State<Arc<AppState>>,
    Path(flight_id): Path<String>,
) -> impl IntoResponse {
    match state.get_flight(&flight_id) {
        Some(snapshot) => Json(snapshot).into_response(),
        None => flight_not_found(),
    }
}

async fn flight_geojson(
    State(state): State<Arc<AppState>>,
    Path(flight_id): Path<String>,
) -> impl IntoResponse {
    match state.route_of(&flight_id) {
        Some(route) => Json(geojson::route_collection(&route)).into_response(),
        None => flight_not_found(),
    }
}

async fn cancel_flight(
    State(state): State<Arc<AppState>>,
    Path(flight_id): Path<String>,
) -> impl IntoResponse {
    match state.cancel_flight(&flight_id) {
        None => flight_not_found(),
        Some(false) => (
            StatusCode::CONFLICT,
            Json(json!({ "error": "flight is not running" })),
        )
            .into_response(),
        Some(true) => (
            StatusCode::ACCEPTED,
            Json(json!({
                "flight_id": flight_id,
                "status": "cancelling",
            })),
        )
            .into_response(),
    }
}

async fn replay_flight(
    State(state): State<Arc<AppState>>,
    Path(flight_id): Path<String>,
) -> impl IntoResponse {
    match state.begin_replay(&flight_id) {
        Ok(plan) => {
            let points = plan.route.len();
            runner::spawn_flight(state, plan);
            tracing::info!("flight {} replaying", flight_id);
            (
                StatusCode::OK,
                Json(json!({
                    "flight_id": flight_id,
                    "points": points,
                    "status": FlightStatus::Running,
                })),
            )
                .into_response()
        }
        Err(refusal) => {
            let status = match refusal {
                ReplayRefusal::NotFound => StatusCode::NOT_FOUND,
                ReplayRefusal::StillRunning => StatusCode::CONFLICT,
                ReplayRefusal::AtCapacity => StatusCode::SERVICE_UNAVAILABLE,
            };
            (status, Json(json!({ "error": refusal.to_string() }))).into_response()
        }
    }
}

fn flight_not_found() -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "flight not found" })),
    )
        .into_response()
}
