//! Configuration structures for swatch.
//!
//! This module provides configuration types for both halves of the system:
//!
//! - [`WatchConfig`] - Change-detection settings (roots, polling cadence)
//! - [`ServerConfig`] - Delivery settings (ports, TLS material)
//! - [`Config`] - Root configuration combining both
//!
//! All configuration types implement [`Default`] with sensible development
//! values: plain HTTP on 8001, 2 s polling, 20 s rescans.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Polling interval for files on the fast tier, in milliseconds.
///
/// Once a file has been observed changing it is re-polled at this cadence
/// for the rest of its watch lifetime. Not configurable: the fast tier
/// exists to catch editor save bursts, and 100 ms is well below
/// human-perceptible reload latency.
pub const FAST_POLL_INTERVAL_MS: u64 = 100;

/// Configuration for the change-detection engine.
///
/// Controls which directory trees are watched and how often files and the
/// trees themselves are re-examined.
///
/// # Examples
///
/// ```
/// use sw_core::WatchConfig;
///
/// let config = WatchConfig::default();
/// assert_eq!(config.poll_interval_ms, 2000);
/// assert_eq!(config.rescan_interval_ms, 20_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Root directories to watch. Fixed for the process lifetime.
    pub roots: Vec<Utf8PathBuf>,

    /// Normal-tier polling interval in milliseconds.
    ///
    /// Every watched file starts on this cadence and stays there until its
    /// first observed modification promotes it to the fast tier
    /// ([`FAST_POLL_INTERVAL_MS`]).
    pub poll_interval_ms: u64,

    /// Interval between full re-walks of all roots, in milliseconds.
    ///
    /// Rescans discover files created after startup and begin watching them.
    pub rescan_interval_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            poll_interval_ms: 2000,
            rescan_interval_ms: 20_000,
        }
    }
}

impl WatchConfig {
    /// Returns the normal-tier polling interval as a [`Duration`](std::time::Duration).
    #[inline]
    #[must_use]
    pub const fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.poll_interval_ms)
    }

    /// Returns the rescan interval as a [`Duration`](std::time::Duration).
    #[inline]
    #[must_use]
    pub const fn rescan_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.rescan_interval_ms)
    }
}

/// Configuration for the delivery server.
///
/// The plain HTTP listener is always started. The TLS listener is started
/// only when both `key` and `cert` are set; `ca` optionally appends an
/// intermediate certificate to the presented chain.
///
/// # Examples
///
/// ```
/// use sw_core::ServerConfig;
///
/// let config = ServerConfig::default();
/// assert_eq!(config.port, 8001);
/// assert_eq!(config.ssl_port, 8002);
/// assert!(!config.tls_enabled());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port for the plain HTTP listener.
    pub port: u16,

    /// Port for the TLS listener (used only when TLS is configured).
    pub ssl_port: u16,

    /// Path to the PEM private key file.
    pub key: Option<Utf8PathBuf>,

    /// Path to the PEM certificate file.
    pub cert: Option<Utf8PathBuf>,

    /// Path to an intermediate certificate file appended to the chain.
    pub ca: Option<Utf8PathBuf>,
}

impl ServerConfig {
    /// Default plain HTTP port.
    pub const DEFAULT_PORT: u16 = 8001;

    /// Default TLS port.
    pub const DEFAULT_SSL_PORT: u16 = 8002;

    /// Returns `true` if both a key and a certificate are configured.
    #[inline]
    #[must_use]
    pub const fn tls_enabled(&self) -> bool {
        self.key.is_some() && self.cert.is_some()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: Self::DEFAULT_PORT,
            ssl_port: Self::DEFAULT_SSL_PORT,
            key: None,
            cert: None,
            ca: None,
        }
    }
}

/// Root configuration for swatch.
///
/// Combines the watcher and server configurations into a single structure
/// that can be constructed from CLI arguments or deserialized.
///
/// # Examples
///
/// ```
/// use sw_core::Config;
///
/// let config = Config::default();
/// let json = serde_json::to_string(&config).unwrap();
/// let parsed: Config = serde_json::from_str(&json).unwrap();
/// assert_eq!(config, parsed);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Change-detection configuration.
    pub watch: WatchConfig,

    /// Delivery server configuration.
    pub server: ServerConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_config_defaults() {
        let config = WatchConfig::default();
        assert!(config.roots.is_empty());
        assert_eq!(config.poll_interval_ms, 2000);
        assert_eq!(config.rescan_interval_ms, 20_000);
    }

    #[test]
    fn test_watch_config_durations() {
        let config = WatchConfig {
            roots: Vec::new(),
            poll_interval_ms: 500,
            rescan_interval_ms: 1000,
        };
        assert_eq!(config.poll_interval(), std::time::Duration::from_millis(500));
        assert_eq!(
            config.rescan_interval(),
            std::time::Duration::from_millis(1000)
        );
    }

    #[test]
    fn test_server_config_tls_detection() {
        let mut config = ServerConfig::default();
        assert!(!config.tls_enabled());

        config.key = Some(Utf8PathBuf::from("server.key"));
        assert!(!config.tls_enabled());

        config.cert = Some(Utf8PathBuf::from("server.crt"));
        assert!(config.tls_enabled());
    }

    #[test]
    fn test_server_config_default_ports() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8001);
        assert_eq!(config.ssl_port, 8002);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = Config {
            watch: WatchConfig {
                roots: vec![Utf8PathBuf::from("/var/www")],
                ..WatchConfig::default()
            },
            server: ServerConfig::default(),
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_config_deserialize_with_missing_fields() {
        let json = r#"{"watch": {"poll_interval_ms": 750}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.watch.poll_interval_ms, 750);
        // Other fields should have defaults
        assert_eq!(config.watch.rescan_interval_ms, 20_000);
        assert!(config.server.key.is_none());
    }

    #[test]
    fn test_fast_interval_is_below_normal_default() {
        assert!(FAST_POLL_INTERVAL_MS < WatchConfig::default().poll_interval_ms);
    }
}
