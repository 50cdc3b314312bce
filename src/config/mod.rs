//! Client configuration.
//!
//! Built-in defaults, overridden by `~/.siip/config.toml` (or `--config`),
//! overridden by command line flags.

pub mod default;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::Cli;
use crate::session::SessionSetting;
use default::*;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub node_url: String,
    pub validator_url: String,
    pub request_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub debounce_ms: u64,
    pub settle_timeout_ms: u64,
    pub scan_concurrency: usize,
    /// Whether the runtime's certificate calls take a trailing email argument
    pub include_email: bool,
    pub signer: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_url: DEFAULT_NODE_URL.to_string(),
            validator_url: DEFAULT_VALIDATOR_URL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            settle_timeout_ms: DEFAULT_SETTLE_TIMEOUT_MS,
            scan_concurrency: DEFAULT_SCAN_CONCURRENCY,
            include_email: false,
            signer: DEFAULT_SIGNER.to_string(),
        }
    }
}

impl Config {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration for this invocation.
    ///
    /// An explicit `--config` file must exist; the per-user file is optional.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::read(path)?,
            None => match get_user_file_path(CONFIG_FILE_NAME) {
                Some(path) if path.exists() => Self::read(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_overrides(cli);
        config.check()?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("loaded configuration from {}", path.display());
        Self::from_toml(&text, path)
    }

    /// Command line flags win over file values.
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(url) = &cli.node_url {
            self.node_url = url.clone();
        }
        if let Some(url) = &cli.validator_url {
            self.validator_url = url.clone();
        }
        if let Some(ms) = cli.timeout_ms {
            self.request_timeout_ms = ms;
        }
        if let Some(signer) = &cli.signer {
            self.signer = signer.clone();
        }
        if cli.with_email {
            self.include_email = true;
        }
    }

    fn check(&self) -> Result<(), ConfigError> {
        for (key, url) in [("node_url", &self.node_url), ("validator_url", &self.validator_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!("{} must be an http(s) URL: {}", key, url)));
            }
        }
        for (key, value) in [
            ("request_timeout_ms", self.request_timeout_ms),
            ("poll_interval_ms", self.poll_interval_ms),
            ("settle_timeout_ms", self.settle_timeout_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{} must be positive", key)));
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }

    pub fn session_setting(&self) -> SessionSetting {
        SessionSetting {
            debounce: Duration::from_millis(self.debounce_ms),
            poll_interval: self.poll_interval(),
            include_email: self.include_email,
        }
    }
}

/// `~/.siip`
pub fn get_user_dir() -> Option<PathBuf> {
    home::home_dir().map(|home| home.join(USER_DIR_NAME))
}

/// Path of `name` inside the per-user directory, creating the directory.
pub fn get_user_file_path(name: &str) -> Option<PathBuf> {
    let dir = get_user_dir()?;
    if !dir.exists() {
        std::fs::create_dir_all(&dir).ok()?;
    }
    Some(dir.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::from_toml(
            "node_url = \"http://10.0.0.5:9933\"\ninclude_email = true\n",
            Path::new("config.toml"),
        )
        .unwrap();
        assert_eq!(config.node_url, "http://10.0.0.5:9933");
        assert!(config.include_email);
        assert_eq!(config.validator_url, DEFAULT_VALIDATOR_URL);
        assert_eq!(config.debounce_ms, DEFAULT_DEBOUNCE_MS);
    }

    #[test]
    fn malformed_file_is_reported() {
        let err = Config::from_toml("node_url = 5", Path::new("bad.toml")).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn flags_override_file_values() {
        let cli = Cli::parse_from([
            "siip",
            "--node-url",
            "http://node:9933",
            "--timeout-ms",
            "500",
            "--with-email",
            "node",
        ]);
        let mut config = Config::default();
        config.apply_overrides(&cli);
        assert_eq!(config.node_url, "http://node:9933");
        assert_eq!(config.request_timeout_ms, 500);
        assert!(config.include_email);
        assert!(config.check().is_ok());
    }

    #[test]
    fn zero_settle_timeout_is_rejected() {
        let config = Config::from_toml("settle_timeout_ms = 0", Path::new("config.toml")).unwrap();
        match config.check() {
            Err(ConfigError::Invalid(msg)) => assert!(msg.contains("settle_timeout_ms")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn non_http_url_is_rejected() {
        let config = Config {
            validator_url: "ws://127.0.0.1:9944".into(),
            ..Config::default()
        };
        assert!(matches!(config.check(), Err(ConfigError::Invalid(_))));
    }
}
