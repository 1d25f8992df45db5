//! Core data types for CirrusCP
//!
//! This module provides the fundamental data types shared across the
//! CirrusCP crates: transfer identity and status, backend kinds, resource
//! locators, and the property shapes applied to remote objects.

use std::collections::HashMap;
use std::fmt;

/// Arbitrary key/value metadata applied to a remote object
pub type Metadata = HashMap<String, String>;

/// Unique identifier for a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransferId(uuid::Uuid);

impl TransferId {
    /// Create a new transfer ID
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Get the inner UUID
    pub fn as_uuid(&self) -> uuid::Uuid {
        self.0
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of storage backend a transfer's source object lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BackendKind {
    /// Flat-namespace object store; properties are key/value metadata
    ObjectStore,
    /// Hierarchical-namespace object store; properties are an access
    /// control descriptor
    HierarchicalStore,
    /// Managed file share; properties are key/value metadata
    FileShare,
}

impl BackendKind {
    /// Get the canonical lowercase name for this backend kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ObjectStore => "object-store",
            Self::HierarchicalStore => "hierarchical-store",
            Self::FileShare => "file-share",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransferStatus {
    /// The transfer has not reached a terminal state yet
    InProgress,
    /// The transfer completed successfully
    Success,
    /// The transfer failed
    Failed,
}

impl TransferStatus {
    /// Check if the status is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InProgress => "in-progress",
            Self::Success => "success",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// URI-like locator for a remote object.
///
/// A locator may carry a time-limited access token as its query component.
/// `as_str` returns the full form for use in remote calls; `redacted` (and
/// `Display`) return the form with the query stripped, which is the only
/// form that may appear in logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Locator(String);

impl Locator {
    /// Create a locator from a URI-like string
    pub fn new<S: Into<String>>(uri: S) -> Self {
        Self(uri.into())
    }

    /// Get the full locator, including any access token
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the locator with the query component (access token) stripped
    pub fn redacted(&self) -> &str {
        match self.0.split_once('?') {
            Some((base, _)) => base,
            None => &self.0,
        }
    }

    /// Check whether this locator carries a query component
    pub fn has_access_token(&self) -> bool {
        self.0.contains('?')
    }
}

impl From<&str> for Locator {
    fn from(uri: &str) -> Self {
        Self::new(uri)
    }
}

impl From<String> for Locator {
    fn from(uri: String) -> Self {
        Self(uri)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.redacted())
    }
}

/// Access control descriptor for a hierarchical-store path.
///
/// All fields are optional; an empty descriptor is valid and re-applies
/// whatever the remote side resolves for an unset field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccessControl {
    /// Owning user of the path
    pub owner: Option<String>,
    /// Owning group of the path
    pub group: Option<String>,
    /// POSIX-style permission string (e.g. "rwxr-x---")
    pub permissions: Option<String>,
    /// Full access control list in its textual form
    pub acl: Option<String>,
}

impl AccessControl {
    /// Create an empty access control descriptor
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the owning user
    pub fn with_owner<S: Into<String>>(mut self, owner: S) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Set the owning group
    pub fn with_group<S: Into<String>>(mut self, group: S) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Set the permission string
    pub fn with_permissions<S: Into<String>>(mut self, permissions: S) -> Self {
        self.permissions = Some(permissions.into());
        self
    }

    /// Set the textual access control list
    pub fn with_acl<S: Into<String>>(mut self, acl: S) -> Self {
        self.acl = Some(acl.into());
        self
    }

    /// Check whether every field is unset
    pub fn is_empty(&self) -> bool {
        self.owner.is_none()
            && self.group.is_none()
            && self.permissions.is_none()
            && self.acl.is_none()
    }
}

/// The properties a transfer applies to its source object.
///
/// Object-store and file-share transfers consume the metadata map; a
/// hierarchical-store transfer consumes the access control descriptor.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertySet {
    /// Key/value metadata
    pub metadata: Metadata,
    /// Access control descriptor
    pub access_control: AccessControl,
}

impl PropertySet {
    /// Create an empty property set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the metadata map
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Set the access control descriptor
    pub fn with_access_control(mut self, access_control: AccessControl) -> Self {
        self.access_control = access_control;
        self
    }

    /// Insert one metadata entry
    pub fn insert<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
