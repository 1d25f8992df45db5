//! Remote storage client seam for CirrusCP
//!
//! This crate defines the narrow interface through which the transfer
//! engine talks to storage backends: one set-properties operation per
//! backend kind, returning structured errors that carry the protocol
//! status code when one was observed. It also provides resource
//! addressing for locators and an in-memory client for dry runs and
//! tests.
//!
//! Real wire protocols live behind [`RemoteClient`] implementations and
//! own their transient-retry policy; the engine issues single best-effort
//! calls.
//!
//! # Examples
//!
//! ```rust
//! use cirruscp_remote::{MemoryRemote, RemoteClient};
//! use cirruscp_types::{Locator, Metadata};
//!
//! # async fn example() -> cirruscp_types::Result<()> {
//! let remote = MemoryRemote::new();
//! let source = Locator::new("https://acct.store.example.net/data/obj?tok=abc");
//! remote.set_object_metadata(&source, &Metadata::new()).await?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod memory;
pub mod resource;

pub use client::{ClientConfig, RemoteClient};
pub use memory::{MemoryRemote, RecordedProperties};
pub use resource::ResourceAddress;
