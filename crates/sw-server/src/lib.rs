//! Reload delivery for swatch.
//!
//! This crate is the outward-facing half of the system: the watch engine
//! signals a shared [`Broadcaster`], and this crate fans that signal out to
//! every browser connected over WebSocket. It also serves the embedded
//! browser client so a page only needs one `<script>` tag.
//!
//! # Surface
//!
//! - Any plain HTTP request → the embedded client script, `text/javascript`.
//! - `GET /ws` → WebSocket; each broadcast delivers one
//!   `{"type":"update"}` text frame per connected client.
//! - An optional TLS listener with the identical surface, enabled when a
//!   key and certificate are configured. Both listeners share one
//!   [`Broadcaster`], so a change is emitted once and every channel sees it.
//!
//! # Example
//!
//! ```no_run
//! use sw_core::ServerConfig;
//! use sw_server::Broadcaster;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sw_server::ServeError> {
//!     let broadcaster = Broadcaster::new();
//!     sw_server::run(&ServerConfig::default(), broadcaster, CancellationToken::new()).await
//! }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod app;
mod broadcast;
mod error;
mod tls;
mod ws;

use std::net::SocketAddr;

use sw_core::ServerConfig;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub use app::CLIENT_SCRIPT;
pub use broadcast::{Broadcaster, ReloadEvent, UPDATE_EVENT};
pub use error::ServeError;
pub use tls::{TlsOptions, load_server_config};

/// Runs the configured listener(s) until `shutdown` is cancelled.
///
/// The plain listener always runs; the TLS listener runs only when both a
/// key and a certificate are configured.
///
/// # Errors
///
/// Returns [`ServeError`] when a socket cannot be bound or the TLS material
/// cannot be loaded. These are startup failures; once serving, connection
/// errors are logged and absorbed.
pub async fn run(
    config: &ServerConfig,
    broadcaster: Broadcaster,
    shutdown: CancellationToken,
) -> Result<(), ServeError> {
    let tls_options = tls_options_from(config);

    let http = serve_http(config.port, broadcaster.clone(), shutdown.clone());
    match tls_options {
        Some(options) => {
            let https = serve_https(config.ssl_port, &options, broadcaster, shutdown);
            tokio::try_join!(http, https)?;
        }
        None => http.await?,
    }
    Ok(())
}

/// Extracts TLS options when the configuration enables TLS.
fn tls_options_from(config: &ServerConfig) -> Option<TlsOptions> {
    match (&config.key, &config.cert) {
        (Some(key), Some(cert)) => Some(TlsOptions {
            key: key.clone(),
            cert: cert.clone(),
            ca: config.ca.clone(),
        }),
        _ => None,
    }
}

/// Serves the plain HTTP listener until `shutdown` is cancelled.
///
/// # Errors
///
/// Returns [`ServeError::Bind`] when the port cannot be bound.
pub async fn serve_http(
    port: u16,
    broadcaster: Broadcaster,
    shutdown: CancellationToken,
) -> Result<(), ServeError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServeError::Bind { addr, source })?;
    tracing::info!(port, "Listening for clients: http://localhost:{port}/");

    let router = app::create_router(broadcaster);
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    Ok(())
}

/// Serves the TLS listener until `shutdown` is cancelled.
///
/// # Errors
///
/// Returns [`ServeError`] when the PEM material cannot be loaded or the
/// port cannot be bound.
pub async fn serve_https(
    port: u16,
    options: &TlsOptions,
    broadcaster: Broadcaster,
    shutdown: CancellationToken,
) -> Result<(), ServeError> {
    let tls_config = tls::load_server_config(options)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServeError::Bind { addr, source })?;
    tracing::info!(port, "Listening for SSL clients: https://localhost:{port}/");

    let router = app::create_router(broadcaster);
    tls::serve(listener, tls_config, router, shutdown).await;
    Ok(())
}
