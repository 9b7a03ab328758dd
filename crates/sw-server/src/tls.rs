//! TLS configuration loading and the HTTPS accept loop.
//!
//! Certificates and keys are PEM files named on the command line. The CA
//! certificate, when given, is appended to the served chain. Handshake and
//! per-connection failures are logged and dropped; only configuration
//! problems are fatal.

use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;

use axum::Router;
use camino::{Utf8Path, Utf8PathBuf};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tokio_util::sync::CancellationToken;

use crate::error::ServeError;

/// Paths to the PEM material for the TLS listener.
#[derive(Debug, Clone)]
pub struct TlsOptions {
    /// Private key file.
    pub key: Utf8PathBuf,
    /// Certificate file.
    pub cert: Utf8PathBuf,
    /// Optional CA certificate, appended to the served chain.
    pub ca: Option<Utf8PathBuf>,
}

/// Loads a rustls server configuration from the given PEM files.
///
/// # Errors
///
/// Returns [`ServeError`] when a file cannot be read, contains no usable
/// material, or the pair is rejected by rustls.
pub fn load_server_config(options: &TlsOptions) -> Result<Arc<rustls::ServerConfig>, ServeError> {
    let mut chain = read_certs(&options.cert)?;
    if chain.is_empty() {
        return Err(ServeError::NoCertificates(options.cert.clone()));
    }
    if let Some(ca) = &options.ca {
        chain.extend(read_certs(ca)?);
    }

    let key = read_private_key(&options.key)?;

    let config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(chain, key)?;
    Ok(Arc::new(config))
}

fn read_certs(
    path: &Utf8Path,
) -> Result<Vec<rustls_pki_types::CertificateDer<'static>>, ServeError> {
    let file = File::open(path).map_err(|source| ServeError::PemRead {
        path: path.to_owned(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| ServeError::PemRead {
            path: path.to_owned(),
            source,
        })
}

fn read_private_key(
    path: &Utf8Path,
) -> Result<rustls_pki_types::PrivateKeyDer<'static>, ServeError> {
    let file = File::open(path).map_err(|source| ServeError::PemRead {
        path: path.to_owned(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    rustls_pemfile::private_key(&mut reader)
        .map_err(|source| ServeError::PemRead {
            path: path.to_owned(),
            source,
        })?
        .ok_or_else(|| ServeError::NoPrivateKey(path.to_owned()))
}

/// Accepts TLS connections and serves the router over each, until
/// `shutdown` is cancelled.
pub(crate) async fn serve(
    listener: TcpListener,
    tls_config: Arc<rustls::ServerConfig>,
    router: Router,
    shutdown: CancellationToken,
) {
    let acceptor = TlsAcceptor::from(tls_config);

    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(accepted) => accepted,
                    Err(error) => {
                        tracing::warn!(error = %error, "Accept failed");
                        continue;
                    }
                };

                let acceptor = acceptor.clone();
                let router = router.clone();
                tokio::spawn(async move {
                    let tls_stream = match acceptor.accept(stream).await {
                        Ok(tls_stream) => tls_stream,
                        Err(error) => {
                            tracing::debug!(peer = %peer, error = %error, "TLS handshake failed");
                            return;
                        }
                    };

                    let service = TowerToHyperService::new(router);
                    let result = auto::Builder::new(TokioExecutor::new())
                        .serve_connection_with_upgrades(TokioIo::new(tls_stream), service)
                        .await;
                    if let Err(error) = result {
                        tracing::debug!(peer = %peer, error = %error, "HTTPS connection error");
                    }
                });
            }
        }
    }
}
