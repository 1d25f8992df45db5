//! Core type system and error handling for CirrusCP
//!
//! This crate provides the foundational types, error handling, and shared
//! data structures used throughout the CirrusCP ecosystem. It includes:
//!
//! - **Error handling**: Structured error types with severity levels and a
//!   protocol-status seam for failure classification
//! - **Core types**: Transfer identity and status, backend kinds, resource
//!   locators with access-token redaction, and property shapes
//! - **Configuration values**: Range-clamped value types and policy structs
//! - **Traits**: Seams for cancellation and identification
//!
//! # Features
//!
//! - `serde`: Enable serialization support
//!
//! # Examples
//!
//! ```rust
//! use cirruscp_types::{Locator, PropertySet};
//!
//! let source = Locator::new("https://acct.store.example.net/data/obj?tok=abc");
//! let properties = PropertySet::new().insert("origin", "sync-job");
//! assert_eq!(source.redacted(), "https://acct.store.example.net/data/obj");
//! assert_eq!(properties.metadata.len(), 1);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{RateLimit, RetryConfig, TimeoutConfig, WorkerCount};
pub use error::{Error, ErrorKind, ErrorSeverity, STATUS_FORBIDDEN};
pub use result::Result;
pub use traits::*;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failure_classification() {
        let error = Error::remote_with_status("credential rejected", STATUS_FORBIDDEN);
        assert!(error.is_auth_failure());
        assert_eq!(error.severity(), ErrorSeverity::Critical);

        let error = Error::remote("connection reset");
        assert!(!error.is_auth_failure());
    }

    #[test]
    fn test_locator_display_is_redacted() {
        let locator = Locator::new("https://host/share/file?sig=secret");
        assert_eq!(format!("{locator}"), "https://host/share/file");
    }

    #[test]
    fn test_worker_count_clamps_into_the_usable_range() {
        assert_eq!(WorkerCount::clamped(8).get(), 8);
        assert_eq!(WorkerCount::clamped(0).get(), 1);
        assert_eq!(WorkerCount::clamped(4096).get(), WorkerCount::CEILING);
    }
}
