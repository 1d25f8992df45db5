//! Configuration management for CirrusCP
//!
//! A deliberately small configuration layer for the transfer engine:
//! serde-backed sections with defaults, YAML or TOML files, a handful of
//! `CIRRUSCP_*` environment overrides, and cross-field validation.
//! Sections absent from a file keep their default values, so a config
//! file only needs to name what it changes.
//!
//! # Examples
//!
//! ```rust,no_run
//! use cirruscp_config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Pool workers: {}", config.engine.workers.get());
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use cirruscp_types::{RateLimit, RetryConfig, TimeoutConfig, WorkerCount};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod error;
pub mod load;

pub use error::{ConfigError, ConfigResult};
pub use load::{ENV_LOG_LEVEL, ENV_PACING_ENABLED, ENV_PACING_OPS, ENV_WORKERS};

/// Main configuration structure for CirrusCP
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Execution pool configuration
    pub engine: EngineConfig,
    /// Remote-operation pacing configuration
    pub pacing: PacingConfig,
    /// Remote client configuration
    pub remote: RemoteConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Execution pool configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of concurrent workers in the shared pool
    pub workers: WorkerCount,
}

/// Remote-operation pacing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Whether pacing is applied at all
    pub enabled: bool,
    /// Operation budget per second when pacing is enabled
    pub operations_per_second: RateLimit,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            operations_per_second: RateLimit::default(),
        }
    }
}

/// Remote client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Timeouts for remote calls
    pub timeouts: TimeoutConfig,
    /// Retry budget owned by the client layer
    pub retry: RetryConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Emit JSON-formatted log lines
    pub json: bool,
    /// Optional log file path; stderr when unset
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}
