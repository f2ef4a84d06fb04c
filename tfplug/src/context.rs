//! Request-scoped cancellation and deadlines
//!
//! Every provider callback receives a [`Context`]. Providers pass it down to
//! whatever performs I/O so that Terraform interrupts (Ctrl-C, operation
//! timeouts) abandon in-flight requests instead of letting them run on.

use crate::error::{Result, TfplugError};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time;

/// Context carries the cancellation signal and optional deadline of one request
/// CRITICAL: Pass this as first parameter to ALL async trait methods
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    deadline: Option<Instant>,
    done: watch::Receiver<bool>,
    done_tx: watch::Sender<bool>,
}

impl Context {
    pub fn new() -> Self {
        Self::with_deadline(None)
    }

    fn with_deadline(deadline: Option<Instant>) -> Self {
        let (done_tx, done_rx) = watch::channel(false);
        Self {
            inner: Arc::new(ContextInner {
                deadline,
                done: done_rx,
                done_tx,
            }),
        }
    }

    /// Derives a context that is cancelled when `timeout` elapses or when
    /// `self` is cancelled, whichever comes first
    /// Must be called from within a tokio runtime
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let mut deadline = Instant::now() + timeout;
        if let Some(parent) = self.inner.deadline {
            deadline = deadline.min(parent);
        }

        let child = Self::with_deadline(Some(deadline));
        let child_tx = child.inner.done_tx.clone();
        let mut parent_done = self.done();
        tokio::spawn(async move {
            let parent_cancelled = async move {
                // A dropped parent can no longer be cancelled
                let cancelled = parent_done.wait_for(|done| *done).await.is_ok();
                if !cancelled {
                    std::future::pending::<()>().await;
                }
            };
            tokio::select! {
                _ = time::sleep_until(deadline.into()) => {}
                _ = parent_cancelled => {}
                _ = child_tx.closed() => return,
            }
            let _ = child_tx.send(true);
        });

        child
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.done.borrow()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Returns a receiver that flips to `true` when work done on behalf of
    /// this context should stop
    pub fn done(&self) -> watch::Receiver<bool> {
        self.inner.done.clone()
    }

    pub fn cancel(&self) {
        let _ = self.inner.done_tx.send(true);
    }

    /// Drives `future` to completion unless the context is cancelled first
    pub async fn run<F: Future>(&self, future: F) -> Result<F::Output> {
        if self.is_cancelled() {
            return Err(TfplugError::Cancelled);
        }

        let mut done = self.done();

        tokio::select! {
            output = future => Ok(output),
            _ = done.wait_for(|done| *done) => Err(TfplugError::Cancelled),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
