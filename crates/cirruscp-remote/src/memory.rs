//! In-memory remote client
//!
//! Applies properties to an in-process map instead of a real backend. Used
//! for dry runs and by engine tests that need a scriptable remote side.

use crate::client::RemoteClient;
use crate::resource::ResourceAddress;
use async_trait::async_trait;
use cirruscp_types::{AccessControl, BackendKind, Error, Locator, Metadata, Result};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Properties recorded against one resource address
#[derive(Debug, Clone, Default)]
pub struct RecordedProperties {
    /// Backend kind of the operation that recorded these properties
    pub kind: Option<BackendKind>,
    /// Last applied metadata
    pub metadata: Metadata,
    /// Last applied access control descriptor
    pub access_control: AccessControl,
}

#[derive(Debug, Clone)]
struct InjectedFailure {
    message: String,
    status: Option<u16>,
}

/// In-memory [`RemoteClient`] implementation.
///
/// Every call either applies its properties to the object map keyed by the
/// canonical (token-free) resource address, or fails with the currently
/// injected failure.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    objects: RwLock<HashMap<String, RecordedProperties>>,
    failure: RwLock<Option<InjectedFailure>>,
}

impl MemoryRemote {
    /// Create an empty in-memory remote
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with the given message and optional
    /// protocol status
    pub async fn fail_with<S: Into<String>>(&self, message: S, status: Option<u16>) {
        *self.failure.write().await = Some(InjectedFailure {
            message: message.into(),
            status,
        });
    }

    /// Clear any injected failure
    pub async fn clear_failure(&self) {
        *self.failure.write().await = None;
    }

    /// Get the properties recorded for a locator, if any
    pub async fn recorded(&self, locator: &Locator) -> Option<RecordedProperties> {
        let address = ResourceAddress::parse(locator).ok()?;
        self.objects.read().await.get(&address.canonical()).cloned()
    }

    /// Number of resources with recorded properties
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Check whether no properties have been recorded
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    async fn check_failure(&self) -> Result<()> {
        if let Some(failure) = self.failure.read().await.as_ref() {
            return Err(Error::Remote {
                message: failure.message.clone(),
                status: failure.status,
            });
        }
        Ok(())
    }

    async fn record<F>(&self, kind: BackendKind, source: &Locator, apply: F) -> Result<()>
    where
        F: FnOnce(&mut RecordedProperties),
    {
        self.check_failure().await?;
        let address = ResourceAddress::parse(source)?;
        let key = address.canonical();

        let mut objects = self.objects.write().await;
        let entry = objects.entry(key).or_default();
        entry.kind = Some(kind);
        apply(entry);

        debug!(resource = %address.canonical(), backend = %kind, "applied properties");
        Ok(())
    }
}

#[async_trait]
impl RemoteClient for MemoryRemote {
    async fn set_object_metadata(&self, source: &Locator, metadata: &Metadata) -> Result<()> {
        self.record(BackendKind::ObjectStore, source, |entry| {
            entry.metadata = metadata.clone();
        })
        .await
    }

    async fn set_access_control(&self, source: &Locator, access: &AccessControl) -> Result<()> {
        self.record(BackendKind::HierarchicalStore, source, |entry| {
            entry.access_control = access.clone();
        })
        .await
    }

    async fn set_share_metadata(&self, source: &Locator, metadata: &Metadata) -> Result<()> {
        self.record(BackendKind::FileShare, source, |entry| {
            entry.metadata = metadata.clone();
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_metadata_recorded_under_canonical_key() {
        let remote = MemoryRemote::new();
        let source = Locator::new("https://host/container/obj?tok=secret");
        let mut metadata = Metadata::new();
        metadata.insert("tier".to_string(), "cool".to_string());

        remote.set_object_metadata(&source, &metadata).await.unwrap();

        // A tokenless locator for the same resource sees the same record.
        let record = remote
            .recorded(&Locator::new("https://host/container/obj"))
            .await
            .unwrap();
        assert_eq!(record.kind, Some(BackendKind::ObjectStore));
        assert_eq!(record.metadata.get("tier").map(String::as_str), Some("cool"));
    }

    #[tokio::test]
    async fn test_access_control_recorded() {
        let remote = MemoryRemote::new();
        let source = Locator::new("https://host/fs/dir/file");
        let access = AccessControl::new().with_owner("svc").with_permissions("rwxr-----");

        remote.set_access_control(&source, &access).await.unwrap();

        let record = remote.recorded(&source).await.unwrap();
        assert_eq!(record.kind, Some(BackendKind::HierarchicalStore));
        assert_eq!(record.access_control.owner.as_deref(), Some("svc"));
    }

    #[tokio::test]
    async fn test_injected_failure_and_recovery() {
        let remote = MemoryRemote::new();
        let source = Locator::new("https://host/share/file");

        remote.fail_with("credential rejected", Some(403)).await;
        let err = remote
            .set_share_metadata(&source, &Metadata::new())
            .await
            .unwrap_err();
        assert!(err.is_auth_failure());
        assert!(remote.is_empty().await);

        remote.clear_failure().await;
        remote
            .set_share_metadata(&source, &Metadata::new())
            .await
            .unwrap();
        assert_eq!(remote.len().await, 1);
    }

    #[tokio::test]
    async fn test_malformed_locator_is_rejected() {
        let remote = MemoryRemote::new();
        let result = remote
            .set_object_metadata(&Locator::new("not-a-locator"), &Metadata::new())
            .await;
        assert!(result.is_err());
        assert!(remote.is_empty().await);
    }
}
