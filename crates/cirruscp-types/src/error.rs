//! Error types and handling for CirrusCP
//!
//! This module provides the error handling system shared by all CirrusCP
//! crates. Errors carry enough structure for the transfer engine to decide
//! whether a failure is local to one transfer or fatal to the whole job.

/// Protocol status code signalling an authentication/authorization failure.
///
/// This is the only protocol-level status interpreted specially by the
/// engine: a remote call rejected with it means the job's credential is bad
/// or expired, not that one particular object is unhealthy.
pub const STATUS_FORBIDDEN: u16 = 403;

/// Error severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Low severity - operation can continue
    Low,
    /// Medium severity - operation should be retried
    Medium,
    /// High severity - operation should be aborted
    High,
    /// Critical severity - the whole job should stop
    Critical,
}

/// Main error type for CirrusCP operations
#[derive(thiserror::Error, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    /// A remote storage call failed
    #[error("remote error: {message}")]
    Remote {
        /// Error message from the remote operation
        message: String,
        /// Protocol status code, when the failure carried one
        status: Option<u16>,
    },

    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        /// Error message from the I/O operation
        message: String,
    },

    /// Configuration error
    #[error("configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },

    /// A locator could not be parsed as a resource address
    #[error("invalid locator '{locator}': {message}")]
    InvalidLocator {
        /// The offending locator, already stripped of any access token
        locator: String,
        /// What was wrong with it
        message: String,
    },

    /// Operation timed out
    #[error("operation timed out after {seconds} seconds")]
    Timeout {
        /// Number of seconds after which the operation timed out
        seconds: u64,
    },

    /// Operation cancelled
    #[error("operation cancelled")]
    Cancelled,

    /// Generic error with custom message
    #[error("{message}")]
    Other {
        /// Custom error message
        message: String,
    },
}

/// Error kind for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Remote storage errors
    Remote,
    /// I/O related errors
    Io,
    /// Configuration errors
    Config,
    /// Locator parsing errors
    InvalidLocator,
    /// Timeout
    Timeout,
    /// Cancellation
    Cancelled,
    /// Other errors
    Other,
}

impl Error {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Remote { .. } => ErrorKind::Remote,
            Self::Io { .. } => ErrorKind::Io,
            Self::Config { .. } => ErrorKind::Config,
            Self::InvalidLocator { .. } => ErrorKind::InvalidLocator,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Other { .. } => ErrorKind::Other,
        }
    }

    /// Get the error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Remote { .. } if self.is_auth_failure() => ErrorSeverity::Critical,
            Self::Remote { .. } => ErrorSeverity::Medium,
            Self::Io { .. } => ErrorSeverity::Medium,
            Self::Config { .. } => ErrorSeverity::High,
            Self::InvalidLocator { .. } => ErrorSeverity::High,
            Self::Timeout { .. } => ErrorSeverity::Medium,
            Self::Cancelled => ErrorSeverity::Low,
            Self::Other { .. } => ErrorSeverity::Medium,
        }
    }

    /// Get the protocol status code carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => *status,
            _ => None,
        }
    }

    /// Check whether this error signals an authentication/authorization
    /// failure (protocol status 403)
    pub fn is_auth_failure(&self) -> bool {
        self.status() == Some(STATUS_FORBIDDEN)
    }

    /// Check if this error is recoverable by resuming the job later
    pub fn is_recoverable(&self) -> bool {
        match self {
            // A rejected credential stays rejected until the operator
            // supplies a new one.
            Self::Remote { .. } => !self.is_auth_failure(),
            Self::Io { .. } | Self::Timeout { .. } | Self::Other { .. } => true,
            Self::Config { .. } | Self::InvalidLocator { .. } | Self::Cancelled => false,
        }
    }

    /// Check if this error should trigger a retry
    pub fn should_retry(&self) -> bool {
        self.is_recoverable() && self.severity() <= ErrorSeverity::Medium
    }

    /// Create a new remote error without a protocol status
    pub fn remote<S: Into<String>>(message: S) -> Self {
        Self::Remote {
            message: message.into(),
            status: None,
        }
    }

    /// Create a new remote error carrying a protocol status code
    pub fn remote_with_status<S: Into<String>>(message: S, status: u16) -> Self {
        Self::Remote {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new invalid-locator error
    pub fn invalid_locator<S: Into<String>>(locator: S, message: S) -> Self {
        Self::InvalidLocator {
            locator: locator.into(),
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: error.to_string(),
        }
    }
}
