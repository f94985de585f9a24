//! WebSocket streaming of animation frames.
use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize, Default)]
pub struct StreamQuery {
    flight_id: Option<String>,
}

/// Handler for WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(params): Query<StreamQuery>,
) -> impl IntoResponse {
    let flight_filter = params.flight_id.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, state, flight_filter))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, flight_filter: Option<String>) {
    let mut rx = state.tx.subscribe();

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Ping(payload))) => {
                        if socket.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                }
            }
            frame = rx.recv() => {
                match frame {
                    Ok(frame) => {
                        if let Some(flight_id) = flight_filter.as_deref() {
                            if frame.flight_id != flight_id {
                                continue;
                            }
                        }
                        if socket.send(Message::Text(frame.payload.as_ref().to_owned())).await.is_err() {
                            break;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => {
                        // Drop missed frames; the animation keeps moving forward.
                        continue;
                    }
                    Err(_) => break,
                }
            }
        }
    }
}
