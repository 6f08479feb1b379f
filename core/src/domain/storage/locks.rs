use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::value_objects::StorageKey;

/// One async mutex per storage key.
///
/// Every read-modify-write of a collection runs while holding its key's
/// guard, so two overlapping mutations of the same collection are applied
/// one after the other instead of the later write clobbering the earlier.
#[derive(Clone, Default)]
pub struct KeyLocks {
    inner: Arc<Mutex<HashMap<StorageKey, Arc<AsyncMutex<()>>>>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: StorageKey) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut locks = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            locks.entry(key).or_default().clone()
        };
        mutex.lock_owned().await
    }
}
