//! WebSocket handler for reload delivery.
//!
//! Forwards broadcast events to the client and consumes whatever the client
//! sends back (keepalive pings, mostly). A send failure or a closed channel
//! ends the connection; a lagged receiver just skips ahead.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::broadcast;

use crate::broadcast::{Broadcaster, ReloadEvent};

/// Handles the WebSocket upgrade on `/ws`.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(broadcaster): State<Broadcaster>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, broadcaster))
}

/// Pumps reload events into an established connection.
async fn handle_socket(mut socket: WebSocket, broadcaster: Broadcaster) {
    let mut receiver: broadcast::Receiver<ReloadEvent> = broadcaster.subscribe();
    tracing::debug!("Reload client connected");

    loop {
        tokio::select! {
            result = receiver.recv() => {
                match result {
                    Ok(event) => {
                        let Ok(msg) = serde_json::to_string(&event) else {
                            continue;
                        };
                        if socket.send(Message::Text(msg.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    // Missed events collapse into the next one; clients
                    // reload everything per event anyway.
                    Err(broadcast::error::RecvError::Lagged(_)) => {}
                }
            }
            result = socket.recv() => {
                match result {
                    Some(Ok(_)) => {}
                    _ => break,
                }
            }
        }
    }

    tracing::debug!("Reload client disconnected");
}
