//! Transfer engine core for CirrusCP
//!
//! This crate contains the property-propagation dispatcher of the
//! transfer engine: one logical transfer has its metadata/access-control
//! properties applied to the source object as a single unit scheduled on
//! the shared worker pool.
//!
//! # Features
//!
//! - **Uniform scheduling**: Property operations share the pool's
//!   concurrency budget and the pacer's throughput budget with data chunks
//! - **Cooperative cancellation**: Checked before scheduling and
//!   propagated into the in-flight remote call
//! - **Failure classification**: Transfer-local failures keep the job
//!   moving; credential rejections surface once at job level
//! - **Exactly-once completion**: Terminal status and the done signal are
//!   recorded once per transfer on every path
//!
//! # Examples
//!
//! ```rust,no_run
//! use cirruscp_engine::{
//!     set_properties, ChannelMonitor, Pacer, PoolConfig, TransferHandle, TransferInfo,
//!     TransferState, WorkerPool,
//! };
//! use cirruscp_remote::MemoryRemote;
//! use cirruscp_types::BackendKind;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let pool = Arc::new(WorkerPool::new(PoolConfig::default()));
//! let (monitor, _events) = ChannelMonitor::new();
//! let (done_tx, mut done_rx) = tokio::sync::mpsc::unbounded_channel();
//!
//! let info = TransferInfo::new(
//!     "https://acct.store.example.net/data/obj?tok=abc",
//!     "https://acct.store.example.net/data/obj-copy",
//!     BackendKind::ObjectStore,
//! );
//! let transfer = TransferState::new(info, Arc::clone(&pool), done_tx);
//!
//! set_properties(
//!     transfer as Arc<dyn TransferHandle>,
//!     Arc::new(MemoryRemote::new()),
//!     Arc::new(Pacer::unlimited()),
//!     Arc::new(monitor),
//! );
//! let _finished = done_rx.recv().await;
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod chunk;
pub mod executor;
pub mod monitor;
pub mod pacer;
pub mod properties;
pub mod transfer;

pub use chunk::{ChunkId, ChunkUnit};
pub use executor::{PoolConfig, WorkerPool};
pub use monitor::{ChannelMonitor, JobEvent, JobMonitor};
pub use pacer::Pacer;
pub use properties::{classify, complete_transfer, set_properties, Outcome};
pub use transfer::{TransferHandle, TransferInfo, TransferState};
