//! Timecode-Over-IP server — entry point.
//!
//! Parses CLI arguments, merges them over the optional TOML config file,
//! initialises logging, and runs the accept loop until Ctrl-C.
//!
//! # Usage
//!
//! ```text
//! tc-server [OPTIONS]
//!
//! Options:
//!   --config <PATH>            TOML configuration file
//!   --host <HOST>              Bind host [default: 127.0.0.1]
//!   --port <PORT>              Bind port [default: 8080]
//!   --status-interval <SECS>   Seconds between status log lines [default: 30]
//!   --no-status                Disable periodic status reporting
//! ```
//!
//! Environment variable overrides: `TC_CONFIG`, `TC_HOST`, `TC_PORT`,
//! `TC_STATUS_INTERVAL`. CLI arguments take precedence when both are
//! present; both take precedence over the config file.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tc_core::FrameRate;
use tc_server::config::{ConfigError, ServerConfig};
use tc_server::net::Server;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Timecode-Over-IP session server.
///
/// Distributes synchronized timecode streams to connected clients over TCP.
#[derive(Debug, Parser)]
#[command(
    name = "tc-server",
    about = "Broadcast-style timecode session server",
    version
)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, env = "TC_CONFIG")]
    config: Option<PathBuf>,

    /// Host or IP address to bind the listener to.
    ///
    /// Use `0.0.0.0` to accept connections from any interface, or
    /// `127.0.0.1` to accept only local connections.
    #[arg(long, env = "TC_HOST")]
    host: Option<String>,

    /// TCP port to listen on.
    #[arg(long, env = "TC_PORT")]
    port: Option<u16>,

    /// Seconds between periodic status log lines.
    #[arg(long, env = "TC_STATUS_INTERVAL")]
    status_interval: Option<u64>,

    /// Disable periodic status reporting.
    #[arg(long)]
    no_status: bool,
}

impl Cli {
    /// Resolves the effective configuration: file first, CLI flags on top.
    fn into_config(self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)?,
            None => ServerConfig::default(),
        };

        if let Some(host) = self.host {
            config.network.host = host;
        }
        if let Some(port) = self.port {
            config.network.port = port;
        }
        if let Some(interval) = self.status_interval {
            config.status.interval_secs = interval;
        }
        if self.no_status {
            config.status.enabled = false;
        }
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Structured logging; level overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.into_config()?;

    info!("Timecode-Over-IP server starting");
    info!(
        "supported framerates: {}",
        FrameRate::supported_labels().join(", ")
    );

    // Shutdown flag shared with the accept loop and the status reporter.
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            running_clone.store(false, Ordering::Relaxed);
        }
    });

    let server = Server::bind(config).await?;
    server.run(running).await?;

    info!("Timecode-Over-IP server stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_leave_overrides_unset() {
        let cli = Cli::parse_from(["tc-server"]);
        assert!(cli.config.is_none());
        assert!(cli.host.is_none());
        assert!(cli.port.is_none());
        assert!(cli.status_interval.is_none());
        assert!(!cli.no_status);
    }

    #[test]
    fn test_no_flags_yield_default_config() {
        let cli = Cli::parse_from(["tc-server"]);
        let config = cli.into_config().unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_host_and_port_flags_override_defaults() {
        let cli = Cli::parse_from(["tc-server", "--host", "0.0.0.0", "--port", "9000"]);
        let config = cli.into_config().unwrap();
        assert_eq!(config.network.host, "0.0.0.0");
        assert_eq!(config.network.port, 9000);
    }

    #[test]
    fn test_no_status_flag_disables_reporting() {
        let cli = Cli::parse_from(["tc-server", "--no-status"]);
        let config = cli.into_config().unwrap();
        assert!(!config.status.enabled);
    }

    #[test]
    fn test_status_interval_flag_overrides_default() {
        let cli = Cli::parse_from(["tc-server", "--status-interval", "5"]);
        let config = cli.into_config().unwrap();
        assert_eq!(config.status.interval_secs, 5);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let cli = Cli::parse_from(["tc-server", "--config", "/nonexistent/tc.toml"]);
        assert!(cli.into_config().is_err());
    }
}
