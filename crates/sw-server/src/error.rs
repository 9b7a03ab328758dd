//! Server error types.

use std::net::SocketAddr;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while bringing up or running a listener.
///
/// Everything here is fatal at startup. Per-connection failures are logged
/// and dropped instead, so one bad client never takes the server down.
#[derive(Debug, Error)]
pub enum ServeError {
    /// The listener socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address the bind was attempted on.
        addr: SocketAddr,
        /// Underlying socket error.
        source: std::io::Error,
    },

    /// A PEM file could not be opened or parsed.
    #[error("failed to read PEM file {path}: {source}")]
    PemRead {
        /// The offending file.
        path: Utf8PathBuf,
        /// Underlying read or parse error.
        source: std::io::Error,
    },

    /// The certificate file parsed but contained no certificates.
    #[error("no certificates found in {0}")]
    NoCertificates(Utf8PathBuf),

    /// The key file parsed but contained no private key.
    #[error("no private key found in {0}")]
    NoPrivateKey(Utf8PathBuf),

    /// The certificate/key pair was rejected by rustls.
    #[error("invalid TLS configuration: {0}")]
    Tls(#[from] rustls::Error),

    /// Listener I/O failure outside bind.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
