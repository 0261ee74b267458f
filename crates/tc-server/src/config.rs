//! TOML-based server configuration.
//!
//! Every field carries a serde default so a partial file — or no file at
//! all — yields a working configuration, and a file written for an older
//! version keeps loading after new fields are added. Example:
//!
//! ```toml
//! [network]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [status]
//! enabled = true
//! interval_secs = 30
//! ```
//!
//! CLI flags override whatever the file provides (see `main.rs`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ServerConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub status: StatusConfig,
}

/// Listener bind settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkConfig {
    /// Host or IP to bind. `"0.0.0.0"` binds all interfaces.
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port for the client protocol.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Periodic status reporting settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusConfig {
    /// Whether the periodic status log line is emitted at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds between status log lines.
    #[serde(default = "default_status_interval")]
    pub interval_secs: u64,
}

impl StatusConfig {
    /// Reporting period; a configured zero is clamped to one second since a
    /// zero-period timer is meaningless.
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_true() -> bool {
    true
}
fn default_status_interval() -> u64 {
    30
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            interval_secs: default_status_interval(),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl ServerConfig {
    /// Loads configuration from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read (including a
    /// missing file — an explicitly requested config must exist) and
    /// [`ConfigError::Parse`] when the TOML is malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_binds_localhost_8080() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.network.host, "127.0.0.1");
        assert_eq!(cfg.network.port, 8080);
    }

    #[test]
    fn test_default_status_reporting_is_enabled_every_30s() {
        let cfg = ServerConfig::default();
        assert!(cfg.status.enabled);
        assert_eq!(cfg.status.period(), Duration::from_secs(30));
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let cfg: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, ServerConfig::default());
    }

    #[test]
    fn test_partial_network_section_overrides_defaults() {
        let cfg: ServerConfig = toml::from_str(
            r#"
[network]
port = 9000
"#,
        )
        .unwrap();
        assert_eq!(cfg.network.port, 9000);
        // Unspecified fields keep their defaults.
        assert_eq!(cfg.network.host, "127.0.0.1");
        assert!(cfg.status.enabled);
    }

    #[test]
    fn test_status_section_round_trips() {
        let mut cfg = ServerConfig::default();
        cfg.status.enabled = false;
        cfg.status.interval_secs = 5;

        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let restored: ServerConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(restored, cfg);
    }

    #[test]
    fn test_zero_interval_is_clamped_to_one_second() {
        let cfg = StatusConfig {
            enabled: true,
            interval_secs: 0,
        };
        assert_eq!(cfg.period(), Duration::from_secs(1));
    }

    #[test]
    fn test_invalid_toml_returns_parse_error() {
        let result: Result<ServerConfig, _> = toml::from_str("[[[ not valid toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_file_is_an_io_error() {
        let result = ServerConfig::load(Path::new("/nonexistent/tc-server.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_load_reads_file_from_disk() {
        let dir = std::env::temp_dir().join(format!("tc_server_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[network]\nhost = \"0.0.0.0\"\nport = 7000\n").unwrap();

        let cfg = ServerConfig::load(&path).unwrap();
        assert_eq!(cfg.network.host, "0.0.0.0");
        assert_eq!(cfg.network.port, 7000);

        std::fs::remove_dir_all(&dir).ok();
    }
}
