//! Hand-off of completed session results to an external sink.
//!
//! The engine calls `record` once per session and only logs a failure. Retry
//! and backoff, if any, belong to the recorder.

use crate::error::RecorderError;
use crate::types::SessionResults;
use tokio::sync::mpsc;

/// Receives completed session results.
///
/// Implementations must not block; hand work off to a queue or task instead.
pub trait SessionRecorder: Send + Sync {
    fn record(&self, results: &SessionResults) -> Result<(), RecorderError>;
}

/// Forwards results into an unbounded channel drained by a sync task.
#[derive(Debug, Clone)]
pub struct ChannelRecorder {
    tx: mpsc::UnboundedSender<SessionResults>,
}

impl ChannelRecorder {
    pub fn new(tx: mpsc::UnboundedSender<SessionResults>) -> Self {
        Self { tx }
    }

    /// Create a recorder and the receiving end for the consumer task.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SessionResults>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl SessionRecorder for ChannelRecorder {
    fn record(&self, results: &SessionResults) -> Result<(), RecorderError> {
        self.tx
            .send(results.clone())
            .map_err(|_| RecorderError::ChannelClosed)
    }
}

/// Logs a one-line summary of each session.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingRecorder;

impl SessionRecorder for TracingRecorder {
    fn record(&self, results: &SessionResults) -> Result<(), RecorderError> {
        tracing::info!(
            session_id = %results.session_id,
            total = results.total_items,
            got_it = results.got_it_count,
            study_more = results.study_more_count,
            accuracy = results.accuracy,
            duration_seconds = results.duration_seconds,
            "study session recorded"
        );
        Ok(())
    }
}
