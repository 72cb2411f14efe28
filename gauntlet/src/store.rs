use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// Thread-safe counter map shared between tasks.
///
/// All access goes through one coarse lock. The read-modify-write inside
/// `increment` is a single critical section, so concurrent increments of the
/// same key never interleave partially and no update is lost. The raw map is
/// never exposed; callers only get serialized operations and snapshots.
#[derive(Debug, Default)]
pub struct SharedCounterStore {
    counts: Mutex<HashMap<String, u64>>,
}

impl SharedCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one to `key` and returns the new count. Absent keys start at
    /// zero.
    ///
    /// If N threads increment the same key concurrently, the multiset of
    /// returned values is exactly `{1, ..., N}`: gapless and monotonic per
    /// key.
    pub fn increment(&self, key: &str) -> u64 {
        let mut counts = self.counts.lock().unwrap();
        let count = counts.entry(key.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// Current count for `key`, zero if never incremented.
    pub fn get(&self, key: &str) -> u64 {
        self.counts.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.lock().unwrap().is_empty()
    }

    /// Sorted snapshot of the current contents, for summary logging.
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.counts
            .lock()
            .unwrap()
            .iter()
            .map(|(key, count)| (key.clone(), *count))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn increment_starts_at_one() {
        let store = SharedCounterStore::new();
        assert_eq!(store.get("k"), 0);
        assert_eq!(store.increment("k"), 1);
        assert_eq!(store.increment("k"), 2);
        assert_eq!(store.get("k"), 2);
    }

    #[test]
    fn keys_are_independent() {
        let store = SharedCounterStore::new();
        store.increment("a");
        store.increment("b");
        store.increment("b");
        assert_eq!(store.get("a"), 1);
        assert_eq!(store.get("b"), 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn concurrent_increments_are_gapless() {
        let store = Arc::new(SharedCounterStore::new());
        let joins: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || store.increment("k"))
            })
            .collect();

        let mut seen: Vec<u64> = joins.into_iter().map(|j| j.join().unwrap()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (1..=16).collect::<Vec<u64>>());
        assert_eq!(store.get("k"), 16);
    }

    #[test]
    fn snapshot_is_sorted() {
        let store = SharedCounterStore::new();
        store.increment("zebra");
        store.increment("apple");
        let keys: Vec<String> = store.snapshot().into_keys().collect();
        assert_eq!(keys, vec!["apple".to_string(), "zebra".to_string()]);
    }
}
