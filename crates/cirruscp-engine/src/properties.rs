//! Property propagation for transfers
//!
//! Applies a transfer's metadata/access-control properties to its source
//! object as one scheduled unit on the shared pool. The work is uniform
//! across backends: one pacer admission, one best-effort remote call
//! selected by the source's backend kind, then shared classification and
//! completion. Failures never propagate past completion; they either mark
//! the one transfer failed or, for a rejected credential, additionally
//! surface once to the job monitor.

use crate::chunk::{ChunkId, ChunkUnit};
use crate::monitor::JobMonitor;
use crate::pacer::Pacer;
use crate::transfer::{TransferHandle, TransferInfo};
use cirruscp_remote::RemoteClient;
use cirruscp_types::{BackendKind, Error, Result, TransferStatus};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Terminal outcome of one property application
#[derive(Debug)]
pub struct Outcome {
    /// Terminal status for the transfer
    pub status: TransferStatus,
    /// The failure, when there was one
    pub error: Option<Error>,
    /// Whether the failure dooms the whole job rather than this transfer
    pub job_fatal: bool,
}

/// Dispatch one transfer's property application onto the shared pool.
///
/// A transfer already cancelled is reported done immediately, with its
/// existing status and without paying any scheduling cost. Otherwise
/// exactly one synthetic whole-operation unit is scheduled; property-set
/// operations share the pool's concurrency budget and the pacer's
/// throughput budget with data chunks rather than running inline.
pub fn set_properties(
    transfer: Arc<dyn TransferHandle>,
    client: Arc<dyn RemoteClient>,
    pacer: Arc<Pacer>,
    monitor: Arc<dyn JobMonitor>,
) {
    if transfer.is_cancelled() {
        transfer.report_done();
        return;
    }

    let id = ChunkId::whole_operation(transfer.transfer_id());
    let work = run_set_properties(Arc::clone(&transfer), client, pacer, monitor);
    transfer.schedule(ChunkUnit::new(id, work));
}

/// The scheduled unit: admission, one remote call, classification,
/// completion.
async fn run_set_properties(
    transfer: Arc<dyn TransferHandle>,
    client: Arc<dyn RemoteClient>,
    pacer: Arc<Pacer>,
    monitor: Arc<dyn JobMonitor>,
) {
    let info = transfer.info().clone();
    let context = transfer.context();

    pacer.admit().await;
    let outcome = classify(apply_for_kind(&*client, &context, &info).await);

    if outcome.job_fatal {
        if let Some(err) = &outcome.error {
            // A dead credential affects every transfer in the job, so the
            // operator is told once at job level, in addition to the
            // per-transfer error line written on completion.
            let message = auth_failure_message(err);
            error!(operation = "set-properties", "{message}");
            monitor.fatal_error(&message);
        }
    }

    complete_transfer(&*transfer, &info, outcome);
}

/// Issue the single best-effort remote call for the transfer's backend
/// kind, racing the transfer's cancellation context so an in-flight call
/// aborts cooperatively. Cancellation after the call completed has no
/// effect.
async fn apply_for_kind(
    client: &dyn RemoteClient,
    context: &CancellationToken,
    info: &TransferInfo,
) -> Result<()> {
    let call = async {
        match info.source_kind {
            BackendKind::ObjectStore => {
                client
                    .set_object_metadata(&info.source, &info.properties.metadata)
                    .await
            }
            BackendKind::HierarchicalStore => {
                client
                    .set_access_control(&info.source, &info.properties.access_control)
                    .await
            }
            BackendKind::FileShare => {
                client
                    .set_share_metadata(&info.source, &info.properties.metadata)
                    .await
            }
        }
    };

    // Biased toward the call: a call that completes in the same poll as a
    // late cancellation still determines the outcome.
    tokio::select! {
        biased;
        result = call => result,
        () = context.cancelled() => Err(Error::Cancelled),
    }
}

/// Decide the transfer-level and job-level consequences of a remote call's
/// result.
///
/// A failure carrying protocol status 403 means the credential itself is
/// bad: the transfer is marked failed like any other, but the job should
/// halt and be resumed with a fresh credential instead of burning the
/// remaining transfer budget. Every other failure stays local to the
/// transfer.
pub fn classify(result: Result<()>) -> Outcome {
    match result {
        Ok(()) => Outcome {
            status: TransferStatus::Success,
            error: None,
            job_fatal: false,
        },
        Err(error) => Outcome {
            status: TransferStatus::Failed,
            job_fatal: error.is_auth_failure(),
            error: Some(error),
        },
    }
}

/// Record the terminal outcome on the transfer: one log line, the status,
/// and the completion signal.
///
/// `report_done` is the last call made on the transfer by this module; the
/// job manager owns the record afterwards.
pub fn complete_transfer(transfer: &dyn TransferHandle, info: &TransferInfo, outcome: Outcome) {
    match &outcome.error {
        Some(err) => {
            error!(
                operation = "set-properties",
                source = %info.source,
                error = %err,
                "property application failed"
            );
        }
        None => {
            info!(
                operation = "set-properties",
                destination = %info.destination,
                "property application successful"
            );
        }
    }

    transfer.set_status(outcome.status);
    transfer.report_done();
}

fn auth_failure_message(error: &Error) -> String {
    format!(
        "Authentication Failed. The access credential is invalid, expired, \
         or missing a required permission: {error}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::{ChannelMonitor, JobEvent};
    use async_trait::async_trait;
    use cirruscp_types::{
        AccessControl, Identifiable, Locator, Metadata, PropertySet, TransferId, STATUS_FORBIDDEN,
    };
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    struct FakeTransfer {
        id: TransferId,
        info: TransferInfo,
        cancel: CancellationToken,
        statuses: Mutex<Vec<TransferStatus>>,
        done_count: AtomicUsize,
        scheduled: Mutex<Vec<ChunkUnit>>,
    }

    impl FakeTransfer {
        fn new(kind: BackendKind) -> Arc<Self> {
            let properties = PropertySet::new()
                .insert("origin", "sync-job")
                .with_access_control(AccessControl::new().with_owner("svc-backup"));
            let info = TransferInfo::new(
                "https://acct.store.example.net/container/obj?tok=src-secret",
                "https://acct.store.example.net/container/obj-copy?tok=dst-secret",
                kind,
            )
            .with_properties(properties);

            Arc::new(Self {
                id: TransferId::new(),
                info,
                cancel: CancellationToken::new(),
                statuses: Mutex::new(Vec::new()),
                done_count: AtomicUsize::new(0),
                scheduled: Mutex::new(Vec::new()),
            })
        }

        fn take_unit(&self) -> Option<ChunkUnit> {
            self.scheduled.lock().unwrap().pop()
        }

        fn scheduled_count(&self) -> usize {
            self.scheduled.lock().unwrap().len()
        }

        fn statuses(&self) -> Vec<TransferStatus> {
            self.statuses.lock().unwrap().clone()
        }

        fn done_count(&self) -> usize {
            self.done_count.load(Ordering::SeqCst)
        }
    }

    impl Identifiable for FakeTransfer {
        fn transfer_id(&self) -> TransferId {
            self.id
        }
    }

    impl TransferHandle for FakeTransfer {
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
            self.scheduled.lock().unwrap().push(unit);
        }

        fn set_status(&self, status: TransferStatus) {
            self.statuses.lock().unwrap().push(status);
        }

        fn report_done(&self) {
            self.done_count.fetch_add(1, Ordering::SeqCst);
        }
    }

    enum Script {
        Succeed,
        FailWith {
            message: &'static str,
            status: Option<u16>,
        },
        FailTimeout,
        Hang,
    }

    struct ScriptedClient {
        script: Script,
        calls: AtomicUsize,
    }

    impl ScriptedClient {
        fn new(script: Script) -> Arc<Self> {
            Arc::new(Self {
                script,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        async fn invoke(&self) -> cirruscp_types::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.script {
                Script::Succeed => Ok(()),
                Script::FailWith { message, status } => Err(Error::Remote {
                    message: (*message).to_string(),
                    status: *status,
                }),
                Script::FailTimeout => Err(Error::Timeout { seconds: 60 }),
                Script::Hang => {
                    std::future::pending::<()>().await;
                    Ok(())
                }
            }
        }
    }

    #[async_trait]
    impl RemoteClient for ScriptedClient {
        async fn set_object_metadata(
            &self,
            _source: &Locator,
            _metadata: &Metadata,
        ) -> cirruscp_types::Result<()> {
            self.invoke().await
        }

        async fn set_access_control(
            &self,
            _source: &Locator,
            _access: &AccessControl,
        ) -> cirruscp_types::Result<()> {
            self.invoke().await
        }

        async fn set_share_metadata(
            &self,
            _source: &Locator,
            _metadata: &Metadata,
        ) -> cirruscp_types::Result<()> {
            self.invoke().await
        }
    }

    fn dispatch(
        transfer: &Arc<FakeTransfer>,
        client: &Arc<ScriptedClient>,
    ) -> mpsc::UnboundedReceiver<JobEvent> {
        let (monitor, event_rx) = ChannelMonitor::new();
        set_properties(
            Arc::clone(transfer) as Arc<dyn TransferHandle>,
            Arc::clone(client) as Arc<dyn RemoteClient>,
            Arc::new(Pacer::unlimited()),
            Arc::new(monitor),
        );
        event_rx
    }

    #[tokio::test]
    async fn test_object_store_success() {
        let transfer = FakeTransfer::new(BackendKind::ObjectStore);
        let client = ScriptedClient::new(Script::Succeed);

        let mut event_rx = dispatch(&transfer, &client);
        transfer.take_unit().unwrap().run().await;

        assert_eq!(client.calls(), 1);
        assert_eq!(transfer.statuses(), vec![TransferStatus::Success]);
        assert_eq!(transfer.done_count(), 1);
        assert!(event_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_hierarchical_store_auth_failure_is_job_fatal() {
        let transfer = FakeTransfer::new(BackendKind::HierarchicalStore);
        let client = ScriptedClient::new(Script::FailWith {
            message: "credential rejected",
            status: Some(STATUS_FORBIDDEN),
        });

        let mut event_rx = dispatch(&transfer, &client);
        transfer.take_unit().unwrap().run().await;

        assert_eq!(client.calls(), 1);
        assert_eq!(transfer.statuses(), vec![TransferStatus::Failed]);
        assert_eq!(transfer.done_count(), 1);

        let JobEvent::FatalError(message) = event_rx.try_recv().unwrap();
        assert!(message.contains("Authentication Failed"));
        assert!(message.contains("credential rejected"));
        // Exactly one job-level notification.
        assert!(event_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_file_share_timeout_is_transfer_local() {
        let transfer = FakeTransfer::new(BackendKind::FileShare);
        let client = ScriptedClient::new(Script::FailTimeout);

        let mut event_rx = dispatch(&transfer, &client);
        transfer.take_unit().unwrap().run().await;

        assert_eq!(client.calls(), 1);
        assert_eq!(transfer.statuses(), vec![TransferStatus::Failed]);
        assert_eq!(transfer.done_count(), 1);
        assert!(event_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_non_forbidden_remote_failure_is_transfer_local() {
        let transfer = FakeTransfer::new(BackendKind::ObjectStore);
        let client = ScriptedClient::new(Script::FailWith {
            message: "server busy",
            status: Some(503),
        });

        let mut event_rx = dispatch(&transfer, &client);
        transfer.take_unit().unwrap().run().await;

        assert_eq!(transfer.statuses(), vec![TransferStatus::Failed]);
        assert_eq!(transfer.done_count(), 1);
        assert!(event_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_pre_cancelled_transfer_skips_the_remote_call() {
        let transfer = FakeTransfer::new(BackendKind::ObjectStore);
        let client = ScriptedClient::new(Script::Succeed);
        transfer.cancel.cancel();

        let mut event_rx = dispatch(&transfer, &client);

        assert_eq!(transfer.scheduled_count(), 0);
        assert_eq!(client.calls(), 0);
        // Done exactly once, existing status untouched.
        assert_eq!(transfer.done_count(), 1);
        assert!(transfer.statuses().is_empty());
        assert!(event_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_exactly_one_whole_operation_unit_is_scheduled() {
        let transfer = FakeTransfer::new(BackendKind::FileShare);
        let client = ScriptedClient::new(Script::Succeed);

        let _event_rx = dispatch(&transfer, &client);

        assert_eq!(transfer.scheduled_count(), 1);
        let unit = transfer.take_unit().unwrap();
        assert!(unit.id().is_whole_operation());
        assert_eq!(unit.id().transfer(), transfer.transfer_id());
    }

    #[tokio::test]
    async fn test_in_flight_cancellation_fails_the_transfer() {
        let transfer = FakeTransfer::new(BackendKind::ObjectStore);
        let client = ScriptedClient::new(Script::Hang);

        let mut event_rx = dispatch(&transfer, &client);
        let unit = transfer.take_unit().unwrap();

        // Cancellation lands after scheduling, while the call is in flight.
        transfer.cancel.cancel();
        unit.run().await;

        assert_eq!(client.calls(), 1);
        assert_eq!(transfer.statuses(), vec![TransferStatus::Failed]);
        assert_eq!(transfer.done_count(), 1);
        assert!(event_rx.try_recv().is_err());
    }

    #[rstest]
    #[case(Ok(()), TransferStatus::Success, false)]
    #[case(Err(Error::remote_with_status("forbidden", 403)), TransferStatus::Failed, true)]
    #[case(Err(Error::remote_with_status("throttled", 503)), TransferStatus::Failed, false)]
    #[case(Err(Error::remote("connection reset")), TransferStatus::Failed, false)]
    #[case(Err(Error::Timeout { seconds: 30 }), TransferStatus::Failed, false)]
    #[case(Err(Error::Cancelled), TransferStatus::Failed, false)]
    fn test_classify(
        #[case] result: cirruscp_types::Result<()>,
        #[case] status: TransferStatus,
        #[case] job_fatal: bool,
    ) {
        let failed = result.is_err();
        let outcome = classify(result);

        assert_eq!(outcome.status, status);
        assert_eq!(outcome.job_fatal, job_fatal);
        assert_eq!(outcome.error.is_some(), failed);
    }

    #[test]
    fn test_auth_message_names_authentication_failure() {
        let error = Error::remote_with_status("credential rejected", STATUS_FORBIDDEN);
        let message = auth_failure_message(&error);

        assert!(message.starts_with("Authentication Failed."));
        assert!(message.contains("credential rejected"));
    }
}
