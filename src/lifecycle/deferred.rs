//! Delayed, cancellable execution of a single action.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Outcome of a deferred action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deferred<T> {
    /// The delay elapsed and the action ran.
    Ran(T),
    /// The token fired first; the action never ran.
    Cancelled,
}

/// An action scheduled to run once after a fixed delay.
///
/// The token is exposed so callers other than the CLI can abort the wait.
/// The CLI itself never cancels.
#[derive(Debug, Clone)]
pub struct DeferredAction {
    delay: Duration,
    token: CancellationToken,
}

impl DeferredAction {
    /// Schedule with a fresh, never-triggered token.
    pub fn new(delay: Duration) -> Self {
        Self::with_token(delay, CancellationToken::new())
    }

    /// Schedule with an externally owned token.
    pub fn with_token(delay: Duration, token: CancellationToken) -> Self {
        Self { delay, token }
    }

    /// Configured delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Token that aborts the wait when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Wait for the delay, then run `action`.
    ///
    /// Cancellation is only observed during the wait; once the action has
    /// started it runs to completion.
    pub async fn run<F, Fut, T>(self, action: F) -> Deferred<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                tracing::debug!("Deferred action cancelled");
                Deferred::Cancelled
            }
            _ = sleep(self.delay) => Deferred::Ran(action().await),
        }
    }
}
