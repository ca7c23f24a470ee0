// src/core/scope.rs
//! Stale-response guards and teardown cancellation for view state

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::debug;

use crate::error::ApiError;

/// Hands out request generations. Only the latest one may write state.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: AtomicU64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == generation
    }

    /// Make every outstanding generation stale.
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}

/// Lifetime of a view. Requests run through it resolve to
/// `ApiError::Cancelled` once the scope is cancelled or dropped.
pub struct ViewScope {
    cancel: watch::Sender<bool>,
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewScope {
    pub fn new() -> Self {
        let (cancel, _) = watch::channel(false);
        Self { cancel }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    pub fn cancel(&self) {
        if !self.cancel.send_replace(true) {
            debug!("View scope cancelled");
        }
    }

    /// A handle that can travel into spawned tasks.
    pub fn handle(&self) -> ScopeHandle {
        ScopeHandle {
            cancelled: self.cancel.subscribe(),
        }
    }

    pub async fn run<F, T>(&self, request: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        self.handle().run(request).await
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Clone)]
pub struct ScopeHandle {
    cancelled: watch::Receiver<bool>,
}

impl ScopeHandle {
    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    pub async fn run<F, T>(mut self, request: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        if self.is_cancelled() {
            return Err(ApiError::Cancelled);
        }

        tokio::select! {
            biased;
            // A closed channel means the scope is gone, which also cancels.
            _ = self.cancelled.wait_for(|cancelled| *cancelled) => Err(ApiError::Cancelled),
            result = request => result,
        }
    }
}
