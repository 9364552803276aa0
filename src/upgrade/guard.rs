use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Exclusive-access guard serializing update attempts.
///
/// One guard is shared by everything that may start an attempt against the
/// same executable. Clones share the lock. Waiters are served in FIFO order
/// and each runs its own full attempt once admitted; nothing is shared or
/// deduplicated between them.
///
/// Executors built with separate guards do not exclude each other, which is
/// what lets tests run independent executors side by side.
#[derive(Debug, Clone, Default)]
pub struct UpdateGuard {
    lock: Arc<Mutex<()>>,
}

/// Proof of exclusive access; releases the guard on drop.
#[derive(Debug)]
pub struct UpdatePermit {
    _permit: OwnedMutexGuard<()>,
}

impl UpdateGuard {
    /// Create an independent guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other attempt holds the guard, then take it.
    pub async fn acquire(&self) -> UpdatePermit {
        UpdatePermit {
            _permit: Arc::clone(&self.lock).lock_owned().await,
        }
    }

    /// Whether an attempt currently holds the guard.
    pub fn is_busy(&self) -> bool {
        self.lock.try_lock().is_err()
    }

    /// Whether two handles share the same lock.
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.lock, &other.lock)
    }
}
