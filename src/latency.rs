//! Simulated network latency.
//!
//! A [`Deferred`] waits out the configured delay on a spawned task, then runs
//! the wrapped operation and resolves exactly once. The operation receives a
//! [`CancellationToken`] that travels with the request it sends, and the
//! service checks it before committing. Cancelling (or dropping) the handle
//! trips the token and aborts the task, so a request that has not been
//! committed yet is discarded, whether it is still waiting out the delay or
//! already queued in a mailbox.

use std::future::Future;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, Instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl std::fmt::Display for Cancelled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("deferred operation cancelled")
    }
}

impl std::error::Error for Cancelled {}

pub struct Deferred<T> {
    handle: JoinHandle<()>,
    token: CancellationToken,
    response: oneshot::Receiver<T>,
}

impl<T: Send + 'static> Deferred<T> {
    pub fn spawn<F, Fut>(delay: Duration, operation: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let (respond_to, response) = oneshot::channel();
        let token = CancellationToken::new();
        let task_token = token.clone();
        let span = tracing::debug_span!("deferred", delay_ms = delay.as_millis() as u64);

        let handle = tokio::spawn(
            async move {
                tokio::time::sleep(delay).await;
                if task_token.is_cancelled() {
                    return;
                }
                debug!("Delay elapsed, running operation");
                let _ = respond_to.send(operation(task_token).await);
            }
            .instrument(span),
        );

        Self {
            handle,
            token,
            response,
        }
    }

    /// Discards the operation. A request already committed by its service
    /// stays committed; only its result is dropped.
    pub fn cancel(self) {
        debug!("Cancelling deferred operation");
        // Drop trips the token and aborts the task.
    }

    /// Waits for the single result.
    pub async fn wait(mut self) -> Result<T, Cancelled> {
        (&mut self.response).await.map_err(|_| Cancelled)
    }
}

impl<U: Send + 'static, E: Send + 'static> Deferred<Result<U, E>> {
    /// Waits for a fallible operation, folding cancellation into its error type.
    pub async fn outcome(self) -> Result<U, E>
    where
        E: From<Cancelled>,
    {
        self.wait().await.map_err(E::from)?
    }
}

impl<T> Drop for Deferred<T> {
    fn drop(&mut self) {
        self.token.cancel();
        self.handle.abort();
    }
}
