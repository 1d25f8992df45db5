//! Remote client seam for property application

use async_trait::async_trait;
use cirruscp_config::RemoteConfig;
use cirruscp_types::{AccessControl, Locator, Metadata, Result, RetryConfig, TimeoutConfig};

/// Remote client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Timeouts for remote calls
    pub timeouts: TimeoutConfig,
    /// Retry budget applied by the client on transient failures.
    ///
    /// The engine issues single best-effort calls; whatever retrying
    /// happens is owned entirely by the client implementation under this
    /// budget.
    pub retry: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeouts: TimeoutConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl From<RemoteConfig> for ClientConfig {
    fn from(remote_config: RemoteConfig) -> Self {
        Self {
            timeouts: remote_config.timeouts,
            retry: remote_config.retry,
        }
    }
}

/// One set-properties operation per backend kind.
///
/// Implementations address the resource named by the full (token-bearing)
/// locator and apply the given properties in a single idempotent remote
/// mutation. Failures carry the protocol status code when one was
/// observed, which is all the engine needs to classify the outcome.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Apply key/value metadata to an object-store object
    async fn set_object_metadata(&self, source: &Locator, metadata: &Metadata) -> Result<()>;

    /// Apply an access control descriptor to a hierarchical-store path
    async fn set_access_control(&self, source: &Locator, access: &AccessControl) -> Result<()>;

    /// Apply key/value metadata to a file-share file
    async fn set_share_metadata(&self, source: &Locator, metadata: &Metadata) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_from_remote_section() {
        let mut remote = RemoteConfig::default();
        remote.retry.max_retries = 7;

        let config = ClientConfig::from(remote);
        assert_eq!(config.retry.max_retries, 7);
        assert_eq!(config.timeouts, TimeoutConfig::default());
    }
}
