//! Cache entry type shared by both storage tiers

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A cached value together with the instant it stops being usable
///
/// Entries are never mutated once created. A newer fetch replaces the whole entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached data
    pub data: T,
    /// When the cache entry expires, stored as epoch milliseconds
    #[serde(rename = "expiresAt", with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// Creates an entry that stays valid for `ttl` starting at `now`
    ///
    /// A TTL too large to represent saturates at the latest representable instant.
    pub fn new(data: T, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: expiry_after(now, ttl),
        }
    }

    /// Returns true while `now` is strictly before the expiry instant
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Computes `now + ttl`, saturating instead of overflowing
pub(crate) fn expiry_after(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(ttl)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_millis(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    #[test]
    fn test_expires_at_is_now_plus_ttl() {
        let entry = CacheEntry::new("x", at_millis(1_000), Duration::from_millis(500));
        assert_eq!(entry.expires_at, at_millis(1_500));
    }

    #[test]
    fn test_validity_is_strictly_before_expiry() {
        let entry = CacheEntry::new(1u8, at_millis(0), Duration::from_millis(10));

        assert!(entry.is_valid(at_millis(0)));
        assert!(entry.is_valid(at_millis(9)));
        assert!(!entry.is_valid(at_millis(10)), "Entry must be stale at expiresAt");
        assert!(!entry.is_valid(at_millis(11)));
    }

    #[test]
    fn test_zero_ttl_is_immediately_stale() {
        let entry = CacheEntry::new(1u8, at_millis(42), Duration::ZERO);
        assert!(!entry.is_valid(at_millis(42)));
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let entry = CacheEntry::new(1u8, at_millis(0), Duration::MAX);
        assert_eq!(entry.expires_at, DateTime::<Utc>::MAX_UTC);
        assert!(entry.is_valid(Utc::now()));
    }

    #[test]
    fn test_serializes_expiry_as_epoch_millis() {
        let entry = CacheEntry::new(vec![1, 2], at_millis(0), Duration::from_millis(43_200_000));
        let json = serde_json::to_string(&entry).expect("Should serialize");

        assert_eq!(json, r#"{"data":[1,2],"expiresAt":43200000}"#);
    }

    #[test]
    fn test_rejects_entry_without_expiry() {
        let result: Result<CacheEntry<u32>, _> = serde_json::from_str(r#"{"data":5}"#);
        assert!(result.is_err());
    }
}
