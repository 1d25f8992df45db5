//! Schedulable units of work
//!
//! Every operation submitted to the shared pool is a chunk, whether it
//! moves a byte range or not. Property application has no natural
//! sub-division, so it is scheduled as a single synthetic chunk covering
//! the whole operation.

use cirruscp_types::TransferId;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::fmt;
use std::future::Future;

/// Identifier for one schedulable unit within a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkId {
    transfer: TransferId,
    offset: u64,
    length: u64,
}

impl ChunkId {
    /// Create a chunk ID for a byte range of a transfer
    pub fn new(transfer: TransferId, offset: u64, length: u64) -> Self {
        Self {
            transfer,
            offset,
            length,
        }
    }

    /// Create the synthetic chunk covering a whole non-divisible operation
    pub fn whole_operation(transfer: TransferId) -> Self {
        Self::new(transfer, 0, 0)
    }

    /// Get the owning transfer's ID
    pub fn transfer(&self) -> TransferId {
        self.transfer
    }

    /// Get the byte offset of this chunk
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Get the byte length of this chunk
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Check whether this is the synthetic whole-operation chunk
    pub fn is_whole_operation(&self) -> bool {
        self.offset == 0 && self.length == 0
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}+{}]", self.transfer, self.offset, self.length)
    }
}

/// One unit of work submitted to the shared pool: a chunk ID and the
/// future that performs it
pub struct ChunkUnit {
    id: ChunkId,
    work: BoxFuture<'static, ()>,
}

impl ChunkUnit {
    /// Create a unit from a chunk ID and its work future
    pub fn new<F>(id: ChunkId, work: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            id,
            work: work.boxed(),
        }
    }

    /// Get the unit's chunk ID
    pub fn id(&self) -> ChunkId {
        self.id
    }

    /// Run the unit to completion, consuming it
    pub async fn run(self) {
        self.work.await;
    }
}

impl fmt::Debug for ChunkUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkUnit").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_whole_operation_chunk() {
        let transfer = TransferId::new();
        let id = ChunkId::whole_operation(transfer);

        assert!(id.is_whole_operation());
        assert_eq!(id.transfer(), transfer);
        assert_eq!(id.offset(), 0);
        assert_eq!(id.length(), 0);
    }

    #[test]
    fn test_ranged_chunk_is_not_whole_operation() {
        let id = ChunkId::new(TransferId::new(), 0, 8 * 1024 * 1024);
        assert!(!id.is_whole_operation());
    }

    #[tokio::test]
    async fn test_unit_runs_its_work() {
        let ran = Arc::new(AtomicBool::new(false));
        let ran_clone = Arc::clone(&ran);

        let unit = ChunkUnit::new(ChunkId::whole_operation(TransferId::new()), async move {
            ran_clone.store(true, Ordering::SeqCst);
        });

        assert!(!ran.load(Ordering::SeqCst));
        unit.run().await;
        assert!(ran.load(Ordering::SeqCst));
    }
}
