//! Loading, saving, and environment overrides for [`Config`]
//!
//! A configuration is assembled in three steps: the first config file
//! found (serde fills unset sections with defaults), then the handful of
//! `CIRRUSCP_*` environment overrides the engine actually consumes, then
//! cross-field validation. There is no layering machinery beyond that.

use crate::{Config, ConfigError, ConfigResult};
use cirruscp_types::{RateLimit, WorkerCount};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment override for the pool worker count
pub const ENV_WORKERS: &str = "CIRRUSCP_WORKERS";
/// Environment override for the pacing on/off switch
pub const ENV_PACING_ENABLED: &str = "CIRRUSCP_PACING_ENABLED";
/// Environment override for the pacing rate in operations per second
pub const ENV_PACING_OPS: &str = "CIRRUSCP_PACING_OPS";
/// Environment override for the log level filter
pub const ENV_LOG_LEVEL: &str = "CIRRUSCP_LOG_LEVEL";

enum Format {
    Yaml,
    Toml,
}

impl Format {
    fn of(path: &Path) -> ConfigResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("toml") => Ok(Self::Toml),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

impl Config {
    /// Load the configuration from the default locations.
    ///
    /// Uses the first config file found (pure defaults when none exists),
    /// applies environment overrides, and validates the result.
    pub fn load() -> ConfigResult<Self> {
        let mut config = match Self::find_default_file() {
            Some(path) => Self::read_file(&path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration from a specific file, then apply environment
    /// overrides and validate
    pub fn load_from<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let mut config = Self::read_file(path.as_ref())?;
        config.apply_overrides(|name| env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration to a file, choosing the format from the
    /// extension
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let path = path.as_ref();
        let content = match Format::of(path)? {
            Format::Yaml => {
                serde_yaml::to_string(self).map_err(|e| ConfigError::Serialization {
                    message: e.to_string(),
                })?
            }
            Format::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialization {
                    message: e.to_string(),
                })?
            }
        };

        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check the cross-field constraints that clamping cannot express
    pub fn validate(&self) -> ConfigResult<()> {
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::validation(format!(
                "log level '{}' is not one of trace, debug, info, warn, error",
                self.logging.level
            )));
        }

        let retry = &self.remote.retry;
        if retry.backoff_multiplier <= 1.0 {
            return Err(ConfigError::validation(
                "retry backoff multiplier must be greater than 1.0",
            ));
        }
        if retry.initial_delay > retry.max_delay {
            return Err(ConfigError::validation(
                "retry initial delay cannot exceed the maximum delay",
            ));
        }

        Ok(())
    }

    fn read_file(path: &Path) -> ConfigResult<Self> {
        let format = Format::of(path)?;
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match format {
            Format::Yaml => serde_yaml::from_str(&text).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Format::Toml => toml::from_str(&text).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    fn apply_overrides<F>(&mut self, var: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = var(ENV_WORKERS) {
            self.engine.workers = WorkerCount::clamped(parse_override(ENV_WORKERS, &value)?);
        }
        if let Some(value) = var(ENV_PACING_ENABLED) {
            self.pacing.enabled = parse_override(ENV_PACING_ENABLED, &value)?;
        }
        if let Some(value) = var(ENV_PACING_OPS) {
            self.pacing.operations_per_second =
                RateLimit::clamped(parse_override(ENV_PACING_OPS, &value)?);
        }
        if let Some(value) = var(ENV_LOG_LEVEL) {
            self.logging.level = value;
        }
        Ok(())
    }

    /// First config file present in the default locations: the working
    /// directory, the user config directory, then `/etc`
    fn find_default_file() -> Option<PathBuf> {
        let mut candidates = vec![PathBuf::from("cirruscp.yaml"), PathBuf::from("cirruscp.toml")];

        if let Some(root) = user_config_root() {
            candidates.push(root.join("cirruscp").join("config.yaml"));
            candidates.push(root.join("cirruscp").join("config.toml"));
        }

        #[cfg(unix)]
        {
            candidates.push(PathBuf::from("/etc/cirruscp/config.yaml"));
            candidates.push(PathBuf::from("/etc/cirruscp/config.toml"));
        }

        candidates.into_iter().find(|path| path.exists())
    }
}

fn user_config_root() -> Option<PathBuf> {
    env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
}

fn parse_override<T>(var: &str, value: &str) -> ConfigResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Env {
        var: var.to_string(),
        message: e.to_string(),
    })
}
