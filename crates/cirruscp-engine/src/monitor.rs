//! Job-level event sink
//!
//! Failures that concern the whole job rather than one transfer (a
//! rejected credential, for instance) are surfaced once through an
//! injected monitor instead of ambient global state, so owners of job
//! lifecycle decide what to do with them and tests can capture them.

use tokio::sync::mpsc;
use tracing::warn;

/// Events surfaced to the owner of job lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    /// A failure severe enough that the whole job should halt and be
    /// resumed by the operator (e.g. with a fresh credential)
    FatalError(String),
}

/// Sink for job-level notifications
pub trait JobMonitor: Send + Sync {
    /// Report a job-fatal failure
    fn fatal_error(&self, message: &str);
}

/// Channel-backed [`JobMonitor`] forwarding events to a receiver owned by
/// the job manager
#[derive(Debug, Clone)]
pub struct ChannelMonitor {
    event_tx: mpsc::UnboundedSender<JobEvent>,
}

impl ChannelMonitor {
    /// Create a monitor and the receiving end of its event stream
    pub fn new() -> (Self, mpsc::UnboundedReceiver<JobEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (Self { event_tx }, event_rx)
    }
}

impl JobMonitor for ChannelMonitor {
    fn fatal_error(&self, message: &str) {
        if self
            .event_tx
            .send(JobEvent::FatalError(message.to_string()))
            .is_err()
        {
            warn!("job monitor receiver dropped, fatal error not delivered: {message}");
        }
    }
}
