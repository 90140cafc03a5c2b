//! Read-through TTL cache with a memory tier and a persistent tier
//!
//! Lookups check the in-process memory tier first, then the persistent store,
//! and only then call the caller's fetch function. A fresh result is written to
//! both tiers. Concurrent lookups for the same key are not coalesced: each one
//! that misses runs its own fetch, and whichever fetch finishes last wins.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, trace, warn};

use super::clock::{Clock, SystemClock};
use super::entry::CacheEntry;
use super::store::{PersistentStore, StorageError};

/// Memory-tier slot holding a typed value
struct MemoryEntry {
    data: Arc<dyn Any + Send + Sync>,
    expires_at: DateTime<Utc>,
}

/// Two-tier cache for fetched values
///
/// Construct one per process and share it (behind an `Arc`) with every consumer.
/// Keys are opaque; callers namespace them to avoid collisions.
pub struct TtlCache {
    memory: Mutex<HashMap<String, MemoryEntry>>,
    store: Arc<dyn PersistentStore>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TtlCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("memory_entries", &self.memory_len())
            .field("store", &self.store)
            .field("clock", &self.clock)
            .finish()
    }
}

impl TtlCache {
    /// Creates a cache over `store` using the system clock
    pub fn new(store: Arc<dyn PersistentStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Creates a cache over `store` with a custom clock
    pub fn with_clock(store: Arc<dyn PersistentStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            memory: Mutex::new(HashMap::new()),
            store,
            clock,
        }
    }

    /// Returns the cached value for `key`, fetching it when no valid entry exists
    ///
    /// # Arguments
    /// * `key` - Namespaced identifier of the resource (e.g., "bank_cache_v2_nigeria")
    /// * `ttl` - Freshness window measured from the moment the fetch completes
    /// * `fetch` - Produces the value on a miss; its error is returned unchanged
    /// * `force_refresh` - Skip both tiers and always call `fetch`
    ///
    /// # Behavior
    /// - A valid memory entry is returned without touching the store
    /// - A valid persistent entry is promoted into memory and returned
    /// - Otherwise `fetch` runs and its result is written to both tiers
    /// - A failed persistent write is logged and ignored; the value is still returned
    /// - A failed fetch writes nothing and leaves any stale entry in place
    pub async fn get<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        fetch: F,
        force_refresh: bool,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !force_refresh {
            if let Some(data) = self.read_memory::<T>(key) {
                trace!(key, "memory tier hit");
                return Ok(data);
            }

            if let Some(entry) = self.read_persistent::<T>(key) {
                debug!(key, "persistent tier hit, promoting to memory");
                self.write_memory(key, &entry);
                return Ok(entry.data);
            }
        }

        debug!(key, force_refresh, "fetching");
        let data = fetch().await?;

        let entry = CacheEntry::new(data, self.clock.now(), ttl);
        self.write_memory(key, &entry);
        if let Err(e) = self.persist(key, &entry) {
            warn!(key, error = %e, "failed to persist cache entry, keeping it in memory only");
        }

        Ok(entry.data)
    }

    /// Removes `key` from both tiers
    ///
    /// Removing a key that is not cached is a no-op.
    pub fn evict(&self, key: &str) {
        self.lock_memory().remove(key);
        if let Err(e) = self.store.remove_item(key) {
            warn!(key, error = %e, "failed to remove persisted cache entry");
        }
    }

    /// Removes every entry from both tiers
    pub fn clear(&self) {
        self.lock_memory().clear();
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear persistent cache");
        }
    }

    /// Serializes `entry` and writes it to the persistent tier
    ///
    /// [`TtlCache::get`] discards the error from this call; durability is best effort.
    pub fn persist<T: Serialize>(
        &self,
        key: &str,
        entry: &CacheEntry<T>,
    ) -> Result<(), StorageError> {
        let json = serde_json::to_string(entry)?;
        self.store.set_item(key, &json)
    }

    /// Whether the memory tier holds a valid entry for `key`
    pub fn contains_valid(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.lock_memory()
            .get(key)
            .is_some_and(|entry| now < entry.expires_at)
    }

    /// Number of entries in the memory tier, stale ones included
    pub fn memory_len(&self) -> usize {
        self.lock_memory().len()
    }

    fn read_memory<T: Clone + 'static>(&self, key: &str) -> Option<T> {
        let now = self.clock.now();
        let memory = self.lock_memory();
        let entry = memory.get(key)?;
        if now >= entry.expires_at {
            return None;
        }
        entry.data.downcast_ref::<T>().cloned()
    }

    fn read_persistent<T: DeserializeOwned>(&self, key: &str) -> Option<CacheEntry<T>> {
        let raw = match self.store.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                debug!(key, error = %e, "persistent tier read failed, treating as miss");
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(key, error = %e, "malformed persistent entry, treating as miss");
                return None;
            }
        };

        entry.is_valid(self.clock.now()).then_some(entry)
    }

    fn write_memory<T: Clone + Send + Sync + 'static>(&self, key: &str, entry: &CacheEntry<T>) {
        let slot = MemoryEntry {
            data: Arc::new(entry.data.clone()),
            expires_at: entry.expires_at,
        };
        self.lock_memory().insert(key.to_string(), slot);
    }

    fn lock_memory(&self) -> MutexGuard<'_, HashMap<String, MemoryEntry>> {
        // No invariant spans the critical sections, so a poisoned map is still usable
        self.memory.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ManualClock, MemoryStore};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(60);

    #[derive(Debug, PartialEq)]
    struct FetchError(&'static str);

    fn create_test_cache() -> (TtlCache, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::at_millis(0));
        let cache = TtlCache::with_clock(store.clone(), clock.clone());
        (cache, store, clock)
    }

    #[tokio::test]
    async fn test_miss_fetches_and_writes_both_tiers() {
        let (cache, store, _clock) = create_test_cache();
        let calls = AtomicUsize::new(0);

        let value = cache
            .get(
                "k",
                TTL,
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, FetchError>("fresh".to_string())
                },
                false,
            )
            .await;

        assert_eq!(value, Ok("fresh".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.contains_valid("k"));
        assert!(store.get_item("k").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_fetch_error_propagates_and_writes_nothing() {
        let (cache, store, _clock) = create_test_cache();

        let result: Result<String, _> = cache
            .get("k", TTL, || async { Err(FetchError("offline")) }, false)
            .await;

        assert_eq!(result, Err(FetchError("offline")));
        assert_eq!(cache.memory_len(), 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_error_keeps_stale_entry() {
        let (cache, store, clock) = create_test_cache();
        cache
            .get("k", TTL, || async { Ok::<_, FetchError>(1u32) }, false)
            .await
            .unwrap();
        let persisted = store.get_item("k").unwrap();

        clock.set_millis(120_000);
        let result = cache
            .get("k", TTL, || async { Err::<u32, _>(FetchError("offline")) }, false)
            .await;

        assert_eq!(result, Err(FetchError("offline")));
        assert_eq!(cache.memory_len(), 1, "Stale entry should remain physically present");
        assert_eq!(store.get_item("k").unwrap(), persisted);
    }

    #[tokio::test]
    async fn test_type_mismatch_in_memory_is_a_miss() {
        let (cache, _store, _clock) = create_test_cache();
        cache
            .get("k", TTL, || async { Ok::<_, FetchError>(7u32) }, false)
            .await
            .unwrap();

        // Same key, different type: memory downcast fails and the persisted JSON
        // does not parse as a string either, so the fetch runs.
        let value = cache
            .get("k", TTL, || async { Ok::<_, FetchError>("text".to_string()) }, false)
            .await;

        assert_eq!(value, Ok("text".to_string()));
    }

    #[tokio::test]
    async fn test_malformed_persistent_entry_is_a_miss() {
        let (cache, store, _clock) = create_test_cache();
        store.set_item("k", "{not json").unwrap();

        let value = cache
            .get("k", TTL, || async { Ok::<_, FetchError>(3u8) }, false)
            .await;

        assert_eq!(value, Ok(3));
    }

    #[tokio::test]
    async fn test_expired_persistent_entry_is_a_miss() {
        let (cache, store, clock) = create_test_cache();
        let stale = CacheEntry::new(1u8, clock.now(), Duration::from_millis(10));
        store
            .set_item("k", &serde_json::to_string(&stale).unwrap())
            .unwrap();
        clock.set_millis(10);

        let value = cache
            .get("k", TTL, || async { Ok::<_, FetchError>(2u8) }, false)
            .await;

        assert_eq!(value, Ok(2));
    }

    #[test]
    fn test_persist_reports_write_failure() {
        let (cache, store, clock) = create_test_cache();
        store.reject_writes(true);

        let entry = CacheEntry::new(1u8, clock.now(), TTL);
        let result = cache.persist("k", &entry);

        assert!(matches!(result, Err(StorageError::Rejected(_))));
    }

    #[test]
    fn test_evict_and_clear_on_empty_cache_are_noops() {
        let (cache, _store, _clock) = create_test_cache();
        cache.evict("missing");
        cache.clear();
        assert_eq!(cache.memory_len(), 0);
    }
}
