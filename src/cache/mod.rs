//! Two-tier TTL cache for remote lookups
//!
//! This module provides a read-through cache that keeps fetched values in an
//! in-process memory tier and a persistent tier that survives restarts. Entries
//! carry an absolute expiry; a stale entry is treated as absent but is not deleted
//! until it is overwritten, evicted, or cleared.

mod clock;
mod entry;
mod store;
mod ttl_cache;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use store::{FileStore, MemoryStore, PersistentStore, StorageError};
pub use ttl_cache::TtlCache;
