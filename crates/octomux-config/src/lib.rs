//! Shared configuration for the octomux daemon.
//!
//! Defaults, an optional TOML file, and `OCTOMUX_`-prefixed environment
//! variables layered with figment, then translated to
//! `octomux_core::MatrixConfig`. The core crates never read disk or the
//! environment; everything funnels through here.

use std::path::Path;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use octomux_core::{MatrixConfig, normalize_url};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config structs ──────────────────────────────────────────────────

/// Top-level daemon configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub matrix: MatrixSettings,

    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub log: LogSettings,
}

/// Matrix connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MatrixSettings {
    /// Device address, with or without a scheme (bare hosts get
    /// `http://`).
    #[serde(default = "default_matrix_url")]
    pub url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,

    /// Verify TLS certificates.
    #[serde(default)]
    pub verify_tls: bool,

    /// Seconds between background health probes. 0 disables the monitor.
    #[serde(default = "default_health_interval_secs")]
    pub health_interval_secs: u64,
}

impl Default for MatrixSettings {
    fn default() -> Self {
        Self {
            url: default_matrix_url(),
            timeout_secs: default_timeout_secs(),
            verify_tls: false,
            health_interval_secs: default_health_interval_secs(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogSettings {
    /// Default filter level when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines instead of human-readable ones.
    #[serde(default = "default_log_json")]
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: default_log_json(),
        }
    }
}

fn default_matrix_url() -> String {
    "http://192.168.1.50".into()
}
fn default_timeout_secs() -> f64 {
    5.0
}
fn default_health_interval_secs() -> u64 {
    30
}
fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_json() -> bool {
    true
}

// ── Loading ─────────────────────────────────────────────────────────

impl ServiceConfig {
    /// Layer defaults, an optional TOML file, and `OCTOMUX_*`
    /// environment variables (nested keys split on `__`, e.g.
    /// `OCTOMUX_MATRIX__URL`).
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            figment = figment.merge(Toml::file(path));
        }
        let config: Self = figment
            .merge(Env::prefixed("OCTOMUX_").split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.matrix.timeout_secs <= 0.0 {
            return Err(ConfigError::Validation {
                field: "matrix.timeout_secs".into(),
                reason: format!("must be positive, got {}", self.matrix.timeout_secs),
            });
        }
        Ok(())
    }

    /// Translate to the core's runtime connection config.
    pub fn matrix_config(&self) -> Result<MatrixConfig, ConfigError> {
        let base_url = normalize_url(&self.matrix.url).map_err(|e| ConfigError::Validation {
            field: "matrix.url".into(),
            reason: e.to_string(),
        })?;

        Ok(MatrixConfig {
            base_url,
            timeout: Duration::from_secs_f64(self.matrix.timeout_secs),
            verify_tls: self.matrix.verify_tls,
            health_interval: Duration::from_secs(self.matrix.health_interval_secs),
        })
    }
}
