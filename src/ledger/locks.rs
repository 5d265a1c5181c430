use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per sweet id.
///
/// Mutations of the same sweet queue on its mutex; different ids never
/// contend here.
#[derive(Default)]
pub struct StockLocks {
    locks: DashMap<u64, Arc<Mutex<()>>>,
}

impl StockLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `id`. The guard may be moved into a
    /// blocking task so the lock outlives an abandoned request.
    pub async fn lock(&self, id: u64) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the map shard is not held across the await
        let mutex = Arc::clone(self.locks.entry(id).or_default().value());
        mutex.lock_owned().await
    }

    /// Drop the entry for `id` if nobody holds or waits on its mutex.
    ///
    /// Holders and waiters keep a clone of the `Arc`, so a count of one
    /// means only the map refers to it. The check and removal happen under
    /// the shard lock, which `lock` also takes before cloning.
    pub fn prune(&self, id: u64) {
        self.locks
            .remove_if(&id, |_, mutex| Arc::strong_count(mutex) == 1);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
