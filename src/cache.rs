//! Injectable query cache.
//!
//! Entries are keyed by `(resource, owner id)`. Every `set` bumps the entry
//! generation so consumers holding an older copy know to re-sync, and every
//! change is published on a `watch` channel so a UI can react to invalidation.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

pub const RECOMMENDATIONS: &str = "recommendations";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryKey {
    resource: &'static str,
    owner: String,
}

impl QueryKey {
    pub fn new(resource: &'static str, owner: impl Into<String>) -> Self {
        Self {
            resource,
            owner: owner.into(),
        }
    }

    pub fn recommendations(user_id: &str) -> Self {
        Self::new(RECOMMENDATIONS, user_id)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource, self.owner)
    }
}

/// What a reader sees for one key.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot<T> {
    pub data: Option<T>,
    pub generation: u64,
    pub stale: bool,
}

struct Entry<T> {
    data: Option<T>,
    generation: u64,
    stale: bool,
    // bumped by every invalidate; lets a slow fetch detect it was overtaken
    epoch: u64,
}

struct Inner<T> {
    counter: AtomicU64,
    entries: Mutex<HashMap<QueryKey, Entry<T>>>,
    changes: watch::Sender<u64>,
}

pub struct QueryCache<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                counter: AtomicU64::new(1),
                entries: Mutex::new(HashMap::new()),
                changes,
            }),
        }
    }
}

impl<T: Clone> QueryCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &QueryKey) -> Option<Snapshot<T>> {
        let entries = self.inner.entries.lock().expect("query cache poisoned");
        entries.get(key).map(|entry| Snapshot {
            data: entry.data.clone(),
            generation: entry.generation,
            stale: entry.stale,
        })
    }

    /// Store fresh data for `key`; returns the new generation.
    pub fn set(&self, key: QueryKey, data: T) -> u64 {
        let generation = self.inner.counter.fetch_add(1, Ordering::Relaxed);
        {
            let mut entries = self.inner.entries.lock().expect("query cache poisoned");
            let epoch = entries.get(&key).map_or(0, |entry| entry.epoch);
            entries.insert(
                key,
                Entry {
                    data: Some(data),
                    generation,
                    stale: false,
                    epoch,
                },
            );
        }
        self.publish();
        generation
    }

    /// Invalidation count for `key`. Capture it before starting a fetch and
    /// hand it back to [`set_if_current`](Self::set_if_current).
    pub fn epoch(&self, key: &QueryKey) -> u64 {
        let entries = self.inner.entries.lock().expect("query cache poisoned");
        entries.get(key).map_or(0, |entry| entry.epoch)
    }

    /// Store `data` only if `key` has not been invalidated since `epoch` was
    /// read. Returns the new generation, or `None` when the data was already
    /// outdated; the entry then stays stale.
    pub fn set_if_current(&self, key: QueryKey, data: T, epoch: u64) -> Option<u64> {
        let generation = {
            let mut entries = self.inner.entries.lock().expect("query cache poisoned");
            let current = entries.get(&key).map_or(0, |entry| entry.epoch);
            if current != epoch {
                tracing::debug!(key = %key, epoch, current, "discarding result of overtaken fetch");
                return None;
            }
            let generation = self.inner.counter.fetch_add(1, Ordering::Relaxed);
            entries.insert(
                key,
                Entry {
                    data: Some(data),
                    generation,
                    stale: false,
                    epoch,
                },
            );
            generation
        };
        self.publish();
        Some(generation)
    }

    /// Mark `key` stale so the next reader refetches. Cached data stays readable.
    pub fn invalidate(&self, key: &QueryKey) {
        {
            let mut entries = self.inner.entries.lock().expect("query cache poisoned");
            let entry = entries.entry(key.clone()).or_insert(Entry {
                data: None,
                generation: 0,
                stale: true,
                epoch: 0,
            });
            entry.stale = true;
            entry.epoch += 1;
        }
        tracing::debug!(key = %key, "query invalidated");
        self.publish();
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        let entries = self.inner.entries.lock().expect("query cache poisoned");
        entries.get(key).is_none_or(|entry| entry.stale)
    }

    /// Receiver that ticks on every stored result and every invalidation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.changes.subscribe()
    }

    fn publish(&self) {
        self.inner.changes.send_modify(|seq| *seq += 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_reads_as_stale() {
        let cache: QueryCache<Vec<u32>> = QueryCache::new();
        let key = QueryKey::recommendations("u1");
        assert!(cache.get(&key).is_none());
        assert!(cache.is_stale(&key));
    }

    #[test]
    fn set_bumps_generation_and_clears_staleness() {
        let cache = QueryCache::new();
        let key = QueryKey::recommendations("u1");
        let first = cache.set(key.clone(), vec![1]);
        cache.invalidate(&key);
        assert!(cache.is_stale(&key));

        let second = cache.set(key.clone(), vec![1, 2]);
        assert!(second > first);
        let snapshot = cache.get(&key).unwrap();
        assert_eq!(snapshot.data, Some(vec![1, 2]));
        assert_eq!(snapshot.generation, second);
        assert!(!snapshot.stale);
    }

    #[test]
    fn invalidate_keeps_data_readable() {
        let cache = QueryCache::new();
        let key = QueryKey::recommendations("u1");
        cache.set(key.clone(), vec![7]);
        cache.invalidate(&key);
        let snapshot = cache.get(&key).unwrap();
        assert_eq!(snapshot.data, Some(vec![7]));
        assert!(snapshot.stale);
    }

    #[test]
    fn keys_are_scoped_by_owner() {
        let cache = QueryCache::new();
        cache.set(QueryKey::recommendations("u1"), vec![1]);
        assert!(cache.get(&QueryKey::recommendations("u2")).is_none());
        assert_eq!(QueryKey::recommendations("u1").to_string(), "recommendations:u1");
    }

    #[test]
    fn invalidation_during_fetch_rejects_the_result() {
        let cache = QueryCache::new();
        let key = QueryKey::recommendations("u1");
        cache.set(key.clone(), vec![1]);

        let started = cache.epoch(&key);
        cache.invalidate(&key);
        assert_eq!(cache.set_if_current(key.clone(), vec![1], started), None);

        let snapshot = cache.get(&key).unwrap();
        assert!(snapshot.stale);
        assert_eq!(snapshot.data, Some(vec![1]));

        let restarted = cache.epoch(&key);
        assert!(cache.set_if_current(key.clone(), vec![1, 2], restarted).is_some());
        assert!(!cache.is_stale(&key));
    }

    #[test]
    fn first_fetch_is_rejected_if_invalidated_before_any_data() {
        let cache: QueryCache<Vec<u32>> = QueryCache::new();
        let key = QueryKey::recommendations("u1");
        let started = cache.epoch(&key);
        cache.invalidate(&key);
        assert_eq!(cache.set_if_current(key.clone(), vec![], started), None);
        assert!(cache.is_stale(&key));
    }

    #[tokio::test]
    async fn subscribers_observe_invalidation() {
        let cache: QueryCache<Vec<u32>> = QueryCache::new();
        let mut rx = cache.subscribe();
        let key = QueryKey::recommendations("u1");
        cache.invalidate(&key);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 1);
    }
}
