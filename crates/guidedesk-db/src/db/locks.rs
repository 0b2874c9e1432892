//! Per-key async mutexes
//!
//! Writers to the same intake queue on one mutex; different intakes proceed in
//! parallel. An entry lives only while someone holds or waits on its key.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// Exclusive access to one key. Dropping it unlocks the key and removes the
/// map entry once no other task is waiting for it.
#[derive(Debug)]
pub struct KeyGuard {
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<KeyedLocks>,
    key: String,
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        self.guard.take();
        self.locks.release(&self.key);
    }
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    pub async fn lock(self: &Arc<Self>, key: &str) -> KeyGuard {
        let mutex = self.locks.entry(key.to_string()).or_default().clone();
        let guard = mutex.lock_owned().await;
        KeyGuard {
            guard: Some(guard),
            locks: self.clone(),
            key: key.to_string(),
        }
    }

    /// Drop the entry for `key` when nobody holds or waits on it.
    fn release(&self, key: &str) {
        self.locks
            .remove_if(key, |_, mutex| Arc::strong_count(mutex) == 1);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
