//! Per-request deadline and cancellation for storage calls

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::types::StorageError;

/// Execution context derived from one inbound invocation
///
/// Storage operations race their work against the cancellation token and
/// the deadline; whichever fires first aborts the operation.
#[derive(Debug, Clone)]
pub struct RequestContext {
    invocation_id: String,
    cancel: CancellationToken,
    deadline: Instant,
}

impl RequestContext {
    pub fn new(invocation_id: impl Into<String>, timeout: Duration) -> Self {
        Self {
            invocation_id: invocation_id.into(),
            cancel: CancellationToken::new(),
            deadline: Instant::now() + timeout,
        }
    }

    pub fn invocation_id(&self) -> &str {
        &self.invocation_id
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Drive `work` until it completes, the token is cancelled or the
    /// deadline passes
    ///
    /// The inner result is returned untouched; the outer error reports an
    /// interruption.
    pub async fn guard<F, T>(&self, work: F) -> Result<T, StorageError>
    where
        F: Future<Output = T>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(StorageError::Cancelled),
            outcome = tokio::time::timeout_at(self.deadline, work) => {
                outcome.map_err(|_| StorageError::DeadlineExceeded)
            }
        }
    }
}
