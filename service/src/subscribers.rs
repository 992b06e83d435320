use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Observers never leave shared state half-written, so a poisoned lock is still usable.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Fan-out of change events to any number of flume receivers.
///
/// Receivers that have been dropped are pruned on the next notification.
pub(crate) struct Subscribers<E> {
    senders: Mutex<Vec<flume::Sender<E>>>,
}

impl<E> Default for Subscribers<E> {
    fn default() -> Self {
        Self {
            senders: Mutex::new(Vec::new()),
        }
    }
}

impl<E: Clone> Subscribers<E> {
    pub(crate) fn subscribe(&self) -> flume::Receiver<E> {
        let (tx, rx) = flume::unbounded();
        lock(&self.senders).push(tx);
        rx
    }

    pub(crate) fn notify(&self, event: E) {
        lock(&self.senders).retain(|tx| tx.send(event.clone()).is_ok());
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        lock(&self.senders).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_reaches_all_subscribers() {
        let subscribers = Subscribers::<u32>::default();
        let rx1 = subscribers.subscribe();
        let rx2 = subscribers.subscribe();

        subscribers.notify(7);

        assert_eq!(rx1.try_recv(), Ok(7));
        assert_eq!(rx2.try_recv(), Ok(7));
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let subscribers = Subscribers::<u32>::default();
        let rx1 = subscribers.subscribe();
        let rx2 = subscribers.subscribe();
        drop(rx2);

        subscribers.notify(1);

        assert_eq!(subscribers.len(), 1);
        assert_eq!(rx1.try_recv(), Ok(1));
    }
}
