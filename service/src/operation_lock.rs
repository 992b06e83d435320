use std::sync::atomic::{AtomicBool, Ordering};

use core_types::events::OperationLockEvent;

use crate::{error::Error, subscribers::Subscribers};

/// Global gate over every remote-mutating operation.
///
/// The lock is shared by all destinations: commands against the device must
/// not interleave, whichever destination they target. It is neither reentrant
/// nor queued; callers check `is_free` and skip when busy.
#[derive(Default)]
pub struct OperationLock {
    busy: AtomicBool,
    subscribers: Subscribers<OperationLockEvent>,
}

/// Holds the lock until dropped.
///
/// Release happens in `Drop`, so it runs on every exit path of the guarded
/// scope, including early returns and unwinding.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct OperationGuard<'a> {
    lock: &'a OperationLock,
}

impl OperationLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_free(&self) -> bool {
        !self.busy.load(Ordering::SeqCst)
    }

    /// Transitions free -> busy, or returns `None` if an operation is already running.
    pub fn try_acquire(&self) -> Option<OperationGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        tracing::debug!("Operation lock acquired");
        self.subscribers
            .notify(OperationLockEvent::FreeChanged { is_free: false });
        Some(OperationGuard { lock: self })
    }

    pub fn acquire(&self) -> Result<OperationGuard<'_>, Error> {
        self.try_acquire().ok_or(Error::OperationInProgress)
    }

    /// Subscribe to free/busy transitions, e.g. to update availability of actions.
    pub fn subscribe(&self) -> flume::Receiver<OperationLockEvent> {
        self.subscribers.subscribe()
    }

    fn release(&self) {
        self.busy.store(false, Ordering::SeqCst);
        tracing::debug!("Operation lock released");
        self.subscribers
            .notify(OperationLockEvent::FreeChanged { is_free: true });
    }
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.lock.release();
    }
}

impl std::fmt::Debug for OperationLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationLock")
            .field("is_free", &self.is_free())
            .finish()
    }
}
