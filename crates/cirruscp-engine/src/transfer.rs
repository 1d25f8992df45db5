//! Transfer records and the job/part-manager seam

use crate::chunk::ChunkUnit;
use crate::executor::WorkerPool;
use cirruscp_types::{
    BackendKind, Cancellable, Identifiable, Locator, PropertySet, TransferId, TransferStatus,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Immutable description of one source-to-destination object mapping
#[derive(Debug, Clone)]
pub struct TransferInfo {
    /// Source object locator (may carry an access token)
    pub source: Locator,
    /// Destination object locator (may carry an access token)
    pub destination: Locator,
    /// Backend kind of the source object
    pub source_kind: BackendKind,
    /// Properties to apply
    pub properties: PropertySet,
}

impl TransferInfo {
    /// Create a transfer description with an empty property set
    pub fn new<L1, L2>(source: L1, destination: L2, source_kind: BackendKind) -> Self
    where
        L1: Into<Locator>,
        L2: Into<Locator>,
    {
        Self {
            source: source.into(),
            destination: destination.into(),
            source_kind,
            properties: PropertySet::new(),
        }
    }

    /// Set the properties to apply
    pub fn with_properties(mut self, properties: PropertySet) -> Self {
        self.properties = properties;
        self
    }
}

/// The narrow interface the dispatcher consumes from the job/part manager.
///
/// The record behind this handle is exclusively owned by the executing
/// unit from the remote call through completion; `report_done` is the last
/// call the engine makes on it.
pub trait TransferHandle: Identifiable + Send + Sync {
    /// Check whether the transfer was cancelled
    fn is_cancelled(&self) -> bool;

    /// Get the transfer description
    fn info(&self) -> &TransferInfo;

    /// Get the cancellation context propagated into remote calls
    fn context(&self) -> CancellationToken;

    /// Submit one unit of work to the shared pool
    fn schedule(&self, unit: ChunkUnit);

    /// Record the transfer's terminal status; latches on first terminal
    /// write
    fn set_status(&self, status: TransferStatus);

    /// Signal the job/part manager that this transfer's work is finished;
    /// safe to reach exactly once
    fn report_done(&self);
}

/// In-memory transfer record backing [`TransferHandle`]
#[derive(Debug)]
pub struct TransferState {
    id: TransferId,
    info: TransferInfo,
    cancel: CancellationToken,
    status: Mutex<TransferStatus>,
    done: AtomicBool,
    pool: Arc<WorkerPool>,
    done_tx: mpsc::UnboundedSender<TransferId>,
}

impl TransferState {
    /// Create a transfer record scheduling onto the given pool and
    /// reporting completion on the given channel
    pub fn new(
        info: TransferInfo,
        pool: Arc<WorkerPool>,
        done_tx: mpsc::UnboundedSender<TransferId>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id: TransferId::new(),
            info,
            cancel: CancellationToken::new(),
            status: Mutex::new(TransferStatus::InProgress),
            done: AtomicBool::new(false),
            pool,
            done_tx,
        })
    }

    /// Get the current status
    pub fn status(&self) -> TransferStatus {
        *self
            .status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Check whether completion has been reported
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }
}

impl Identifiable for TransferState {
    fn transfer_id(&self) -> TransferId {
        self.id
    }
}

impl Cancellable for TransferState {
    fn cancel(&self) {
        self.cancel.cancel();
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl TransferHandle for TransferState {
    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn info(&self) -> &TransferInfo {
        &self.info
    }

    fn context(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn schedule(&self, unit: ChunkUnit) {
        self.pool.schedule(unit);
    }

    fn set_status(&self, status: TransferStatus) {
        let mut current = self
            .status
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if current.is_terminal() {
            warn!(
                transfer = %self.id,
                "ignoring status {status} for transfer already in terminal status {current}"
            );
            return;
        }
        *current = status;
    }

    fn report_done(&self) {
        if self.done.swap(true, Ordering::SeqCst) {
            warn!(transfer = %self.id, "transfer reported done more than once");
            return;
        }
        let _ = self.done_tx.send(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkId;
    use crate::executor::PoolConfig;

    fn state_with_channel() -> (Arc<TransferState>, mpsc::UnboundedReceiver<TransferId>) {
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        let pool = Arc::new(WorkerPool::new(PoolConfig::default()));
        let info = TransferInfo::new(
            "https://host/container/obj?tok=abc",
            "https://host/container/obj",
            BackendKind::ObjectStore,
        );
        (TransferState::new(info, pool, done_tx), done_rx)
    }

    #[tokio::test]
    async fn test_status_latches_on_first_terminal_write() {
        let (state, _done_rx) = state_with_channel();
        assert_eq!(state.status(), TransferStatus::InProgress);

        state.set_status(TransferStatus::Success);
        state.set_status(TransferStatus::Failed);

        assert_eq!(state.status(), TransferStatus::Success);
    }

    #[tokio::test]
    async fn test_done_is_reported_exactly_once() {
        let (state, mut done_rx) = state_with_channel();

        state.report_done();
        state.report_done();

        assert!(state.is_done());
        assert_eq!(done_rx.recv().await, Some(state.transfer_id()));
        assert!(done_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_cancellation_reaches_the_context() {
        let (state, _done_rx) = state_with_channel();
        let context = state.context();

        assert!(!TransferHandle::is_cancelled(&*state));
        Cancellable::cancel(&*state);

        assert!(TransferHandle::is_cancelled(&*state));
        assert!(context.is_cancelled());
    }

    #[tokio::test]
    async fn test_schedule_runs_on_the_pool() {
        let (state, _done_rx) = state_with_channel();
        let ran = Arc::new(AtomicBool::new(false));
        let ran_clone = Arc::clone(&ran);

        state.schedule(ChunkUnit::new(
            ChunkId::whole_operation(state.transfer_id()),
            async move {
                ran_clone.store(true, Ordering::SeqCst);
            },
        ));

        // The pool tracks the unit until it finishes.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(ran.load(Ordering::SeqCst));
    }
}
