//! Error types for configuration management

use cirruscp_types::Error as CirrusError;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read or written
    #[error("cannot access config file '{path}': {source}")]
    Io {
        /// Path to the configuration file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The configuration file did not parse
    #[error("cannot parse config file '{path}': {message}")]
    Parse {
        /// Path to the configuration file
        path: PathBuf,
        /// Parser error message
        message: String,
    },

    /// The file extension names no supported format
    #[error("config file '{path}' has no recognized extension (yaml, yml, toml)")]
    UnsupportedFormat {
        /// Path to the configuration file
        path: PathBuf,
    },

    /// An environment override did not parse
    #[error("invalid value in environment variable {var}: {message}")]
    Env {
        /// Name of the environment variable
        var: String,
        /// Parser error message
        message: String,
    },

    /// The loaded configuration is inconsistent
    #[error("configuration validation failed: {message}")]
    Validation {
        /// Validation error message
        message: String,
    },

    /// The configuration could not be serialized
    #[error("cannot serialize configuration: {message}")]
    Serialization {
        /// Serializer error message
        message: String,
    },
}

impl ConfigError {
    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl From<ConfigError> for CirrusError {
    fn from(error: ConfigError) -> Self {
        CirrusError::config(error.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;
    use cirruscp_types::ErrorKind;

    #[test]
    fn test_conversion_into_the_shared_error_type() {
        let error: CirrusError = ConfigError::validation("bad log level").into();

        assert_eq!(error.kind(), ErrorKind::Config);
        assert!(error.to_string().contains("bad log level"));
    }
}
