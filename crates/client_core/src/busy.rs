//! In-flight gate and cancellation plumbing for operations.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::sync::watch;

/// Shared flag that is set for exactly one in-flight network exchange.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag {
    inner: Arc<AtomicBool>,
}

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.inner.load(Ordering::Acquire)
    }

    /// Sets the flag unless it is already set. The flag is cleared when the
    /// returned guard is dropped, whatever path the holder exits through.
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.inner
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard {
                inner: Arc::clone(&self.inner),
            })
    }
}

#[derive(Debug)]
pub struct BusyGuard {
    inner: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.inner.store(false, Ordering::Release);
        tracing::trace!("busy flag released");
    }
}

/// Requests cancellation of the job it was created with.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx: Arc::new(tx) }, CancelToken { rx })
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested. Never resolves if every handle
    /// is dropped without cancelling.
    pub async fn cancelled(&mut self) {
        loop {
            let cancelled = *self.rx.borrow_and_update();
            if cancelled {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}
