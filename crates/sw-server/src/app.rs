//! Router construction.
//!
//! The HTTP surface is deliberately tiny: `/ws` upgrades to the reload
//! WebSocket, and every other request receives the embedded client script so
//! pages can load it from any path.

use axum::Router;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;

use crate::broadcast::Broadcaster;
use crate::ws;

/// The browser-side reload client, embedded at compile time.
pub const CLIENT_SCRIPT: &str = include_str!("../assets/swatch-client.js");

/// Builds the router shared by the plain and TLS listeners.
pub(crate) fn create_router(broadcaster: Broadcaster) -> Router {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .fallback(client_script)
        .with_state(broadcaster)
}

/// Serves the embedded client script for any non-WebSocket request.
async fn client_script() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/javascript")], CLIENT_SCRIPT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_script_is_embedded() {
        assert!(CLIENT_SCRIPT.contains("WebSocket"));
        assert!(CLIENT_SCRIPT.contains("update"));
    }
}
