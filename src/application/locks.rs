use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex as SlotMutex, PoisonError};
use tokio::sync::{Mutex, OwnedMutexGuard};

struct Slot {
    mutex: Arc<Mutex<()>>,
    /// Guards held plus tasks still waiting on `mutex`.
    claims: usize,
}

type Slots<K> = Arc<SlotMutex<HashMap<K, Slot>>>;

/// A table of async mutexes, one per key.
///
/// Holding the guard returned by [`KeyedLocks::lock`] serializes every
/// mutation of that key's aggregate; other keys proceed independently.
/// A key's slot is dropped once nobody holds or waits for it, so the table
/// only ever contains keys that are in use.
pub struct KeyedLocks<K> {
    slots: Slots<K>,
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self {
            slots: Arc::new(SlotMutex::new(HashMap::new())),
        }
    }

    pub async fn lock(&self, key: &K) -> KeyedGuard<K> {
        let claim = self.claim(key);
        let guard = claim.mutex.clone().lock_owned().await;
        KeyedGuard {
            _guard: guard,
            _claim: claim,
        }
    }

    fn claim(&self, key: &K) -> Claim<K> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = slots.entry(key.clone()).or_insert_with(|| Slot {
            mutex: Arc::new(Mutex::new(())),
            claims: 0,
        });
        slot.claims += 1;
        Claim {
            key: key.clone(),
            mutex: slot.mutex.clone(),
            slots: self.slots.clone(),
        }
    }

    #[cfg(test)]
    fn slot_count(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Interest in one key's slot, released on drop whether or not the lock was won.
struct Claim<K: Eq + Hash> {
    key: K,
    mutex: Arc<Mutex<()>>,
    slots: Slots<K>,
}

impl<K: Eq + Hash> Drop for Claim<K> {
    fn drop(&mut self) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = slots.get_mut(&self.key) {
            slot.claims -= 1;
            if slot.claims == 0 {
                slots.remove(&self.key);
            }
        }
    }
}

/// Exclusive access to one key until dropped.
pub struct KeyedGuard<K: Eq + Hash> {
    _guard: OwnedMutexGuard<()>,
    _claim: Claim<K>,
}
