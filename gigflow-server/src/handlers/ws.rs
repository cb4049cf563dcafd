//! WebSocket endpoint streaming hire/reject outcome events.
//!
//! Connections are unauthenticated: every client receives the full event
//! stream and filters on `user_id` itself. The payload carries nothing
//! beyond what the gig listing already exposes.

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::AppState;

/// `GET /ws` — upgrades and forwards every notification event as JSON text.
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let mut events = state.hub.subscribe();
    debug!(
        subscribers = state.hub.subscriber_count(),
        "websocket client connected"
    );

    loop {
        tokio::select! {
            event = events.recv() => {
                let event = match event {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        // Slow consumer. Events are advisory; clients recover
                        // full state from the HTTP API.
                        warn!(skipped, "websocket client lagged behind event stream");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };

                let payload = match serde_json::to_string(&event) {
                    Ok(payload) => payload,
                    Err(err) => {
                        warn!(error = %err, "failed to serialize notification event");
                        continue;
                    }
                };
                if socket.send(Message::Text(payload.into())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    // Inbound frames are ignored; the stream is one-way.
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    debug!("websocket client disconnected");
}
