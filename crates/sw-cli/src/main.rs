//! CLI entry point for swatch.
//!
//! This binary wires the change-detection engine to the delivery server:
//! it validates the watched directories, starts the rescan loop, and serves
//! the reload WebSocket plus the embedded browser client.
//!
//! # Usage
//!
//! ```bash
//! swatch [OPTIONS] [DIR]...
//!
//! # Watch the current directory, plain HTTP on 8001
//! swatch
//!
//! # Watch two trees (colon-separated lists also work)
//! swatch ./public/css ./themes
//! swatch ./public/css:./themes
//!
//! # Add a TLS listener on 8002
//! swatch --key server.key --cert server.crt ./public
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::Parser;
use sw_core::{Config, ConfigError, ServerConfig, StylesheetExtensions, WatchConfig};
use sw_server::Broadcaster;
use sw_watcher::WatchEngine;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Watches directory trees for stylesheet changes and tells connected
/// browsers to reload them.
///
/// Any HTTP request to the server returns the browser client script; pages
/// include it with a single `<script>` tag and get live style reloading.
#[derive(Parser)]
#[command(name = "swatch", version, about, long_about = None)]
struct Cli {
    /// Directories to watch.
    ///
    /// Colon-separated lists are accepted and flattened. Defaults to the
    /// current directory if none are given.
    #[arg(value_name = "DIR")]
    directories: Vec<String>,

    /// Port for the plain HTTP listener.
    #[arg(short, long, default_value_t = ServerConfig::DEFAULT_PORT, env = "SWATCH_PORT")]
    port: u16,

    /// Port for the TLS listener (requires --key and --cert).
    #[arg(short = 's', long, default_value_t = ServerConfig::DEFAULT_SSL_PORT, env = "SWATCH_SSL_PORT")]
    ssl_port: u16,

    /// Path to the PEM private key file for TLS.
    #[arg(short, long, env = "SWATCH_KEY")]
    key: Option<Utf8PathBuf>,

    /// Path to the PEM certificate file for TLS.
    #[arg(short, long, env = "SWATCH_CERT")]
    cert: Option<Utf8PathBuf>,

    /// Path to an intermediate CA certificate appended to the chain.
    #[arg(short = 'a', long, env = "SWATCH_CA")]
    ca: Option<Utf8PathBuf>,

    /// Milliseconds between full rescans of the watched trees.
    #[arg(short = 't', long = "refresh", default_value_t = 20_000, value_name = "MS")]
    refresh: u64,

    /// Milliseconds between polls of a file that has not changed yet.
    #[arg(long, default_value_t = 2000, value_name = "MS")]
    poll: u64,

    /// Enable verbose logging (debug level).
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long)]
    no_color: bool,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},hyper=warn,mio=warn,tungstenite=warn"))
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_ansi(use_ansi))
        .with(filter)
        .init();
}

/// Builds a [`Config`] from CLI arguments.
///
/// # Errors
///
/// Returns [`ConfigError`] when a watched directory does not exist or is
/// not a directory, or when an interval is zero.
fn build_config(cli: &Cli) -> Result<Config, ConfigError> {
    if cli.poll == 0 {
        return Err(ConfigError::invalid_option("--poll", "must be at least 1"));
    }
    if cli.refresh == 0 {
        return Err(ConfigError::invalid_option(
            "--refresh",
            "must be at least 1",
        ));
    }

    let roots = parse_roots(&cli.directories);
    for root in &roots {
        if !root.exists() {
            return Err(ConfigError::MissingRoot(root.clone()));
        }
        if !root.is_dir() {
            return Err(ConfigError::NotADirectory(root.clone()));
        }
    }

    Ok(Config {
        watch: WatchConfig {
            roots,
            poll_interval_ms: cli.poll,
            rescan_interval_ms: cli.refresh,
        },
        server: ServerConfig {
            port: cli.port,
            ssl_port: cli.ssl_port,
            key: cli.key.clone(),
            cert: cli.cert.clone(),
            ca: cli.ca.clone(),
        },
    })
}

/// Flattens positional directory arguments, splitting colon-separated lists.
///
/// Falls back to the current directory when nothing was given.
fn parse_roots(directories: &[String]) -> Vec<Utf8PathBuf> {
    let mut roots: Vec<Utf8PathBuf> = directories
        .iter()
        .flat_map(|arg| arg.split(':'))
        .filter(|part| !part.is_empty())
        .map(Utf8PathBuf::from)
        .collect();

    if roots.is_empty() {
        roots.push(Utf8PathBuf::from("."));
    }
    roots
}

// =============================================================================
// RUNTIME
// =============================================================================

/// Resolves when the process is asked to stop (ctrl-c, or SIGTERM on Unix).
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(error) => {
                tracing::warn!(error = %error, "Failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Runs the engine and server until a shutdown signal arrives.
async fn run(config: Config) -> color_eyre::Result<()> {
    let broadcaster = Broadcaster::new();
    let shutdown = CancellationToken::new();

    let engine = WatchEngine::new(
        config.watch,
        StylesheetExtensions::default(),
        Arc::new(broadcaster.clone()),
    );

    let engine_task = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            // Rescan counts are surfaced here, not inside the engine.
            engine
                .run_with(shutdown, |summary| {
                    info!(
                        new_files = summary.new_files,
                        total_watched = summary.total_watched,
                        "Now watching {} new files",
                        summary.new_files
                    );
                })
                .await;
        })
    };

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            info!("Shutdown signal received, stopping");
            shutdown.cancel();
        });
    }

    sw_server::run(&config.server, broadcaster, shutdown).await?;
    engine_task.await?;
    Ok(())
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.no_color);

    // Startup validation is fatal; nothing is watched or served on error.
    let config = build_config(&cli)?;
    info!(
        roots = ?config.watch.roots,
        port = config.server.port,
        tls = config.server.tls_enabled(),
        "Starting swatch"
    );

    run(config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_cli() -> Cli {
        Cli::parse_from(["swatch"])
    }

    #[test]
    fn test_parse_roots_defaults_to_current_dir() {
        assert_eq!(parse_roots(&[]), vec![Utf8PathBuf::from(".")]);
    }

    #[test]
    fn test_parse_roots_splits_colon_lists() {
        let args = vec!["./a:./b".to_string(), "./c".to_string()];
        assert_eq!(
            parse_roots(&args),
            vec![
                Utf8PathBuf::from("./a"),
                Utf8PathBuf::from("./b"),
                Utf8PathBuf::from("./c"),
            ]
        );
    }

    #[test]
    fn test_parse_roots_ignores_empty_segments() {
        let args = vec!["./a::./b:".to_string()];
        assert_eq!(
            parse_roots(&args),
            vec![Utf8PathBuf::from("./a"), Utf8PathBuf::from("./b")]
        );
    }

    #[test]
    fn test_build_config_rejects_missing_directory() {
        let mut cli = base_cli();
        cli.directories = vec!["/definitely/not/a/real/path".to_string()];

        assert!(matches!(
            build_config(&cli),
            Err(ConfigError::MissingRoot(_))
        ));
    }

    #[test]
    fn test_build_config_rejects_zero_intervals() {
        let mut cli = base_cli();
        cli.poll = 0;
        assert!(matches!(
            build_config(&cli),
            Err(ConfigError::InvalidOption { .. })
        ));

        let mut cli = base_cli();
        cli.refresh = 0;
        assert!(matches!(
            build_config(&cli),
            Err(ConfigError::InvalidOption { .. })
        ));
    }

    #[test]
    fn test_build_config_defaults() {
        let dir = tempfile::TempDir::new().expect("create temp dir");
        let mut cli = base_cli();
        cli.directories = vec![dir.path().to_string_lossy().into_owned()];

        let config = build_config(&cli).expect("config should build");
        assert_eq!(config.server.port, 8001);
        assert_eq!(config.server.ssl_port, 8002);
        assert_eq!(config.watch.poll_interval_ms, 2000);
        assert_eq!(config.watch.rescan_interval_ms, 20_000);
        assert!(!config.server.tls_enabled());
    }

    #[test]
    fn test_cli_accepts_short_flags() {
        let cli = Cli::parse_from([
            "swatch",
            "-p",
            "9001",
            "-s",
            "9002",
            "-t",
            "5000",
            "--poll",
            "1000",
            "./css",
        ]);
        assert_eq!(cli.port, 9001);
        assert_eq!(cli.ssl_port, 9002);
        assert_eq!(cli.refresh, 5000);
        assert_eq!(cli.poll, 1000);
        assert_eq!(cli.directories, vec!["./css".to_string()]);
    }
}
