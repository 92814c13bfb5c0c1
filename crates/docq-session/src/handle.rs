//! Cloneable control handle shared between a session and its frontends.

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_util::sync::CancellationToken;

/// Remote control for a [`Session`](crate::Session).
///
/// Input loops hold a clone so they can cancel an answer while the session
/// itself is mutably borrowed by the ask in progress.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<HandleState>,
}

struct HandleState {
    token: Mutex<CancellationToken>,
    streaming: AtomicBool,
}

impl SessionHandle {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(HandleState {
                token: Mutex::new(CancellationToken::new()),
                streaming: AtomicBool::new(false),
            }),
        }
    }

    /// Install a fresh token and mark the session busy. The returned token
    /// belongs to the stream being opened; aborts from earlier asks cannot
    /// reach it.
    pub(crate) fn arm(&self) -> CancellationToken {
        let fresh = CancellationToken::new();
        *self.inner.token.lock() = fresh.clone();
        self.inner.streaming.store(true, Ordering::Release);
        fresh
    }

    /// Mark the session idle again.
    pub(crate) fn settle(&self) {
        self.inner.streaming.store(false, Ordering::Release);
    }

    /// Cancel the in-flight answer, if any.
    pub fn abort(&self) {
        self.inner.token.lock().cancel();
    }

    /// Whether an answer is currently streaming.
    pub fn is_running(&self) -> bool {
        self.inner.streaming.load(Ordering::Acquire)
    }
}
