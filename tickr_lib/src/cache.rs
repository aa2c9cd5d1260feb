//! In-memory TTL cache for quote records.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;

use crate::record::{AssetKind, QuoteRecord};

/// Default time-to-live for cached quotes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// A cached record with the instant it was captured.
struct CacheEntry {
    record: QuoteRecord,
    captured_at: Instant,
}

/// Process-wide quote cache guarded by a single lock.
///
/// Stale entries stay in the map until overwritten; `get` simply stops
/// returning them once they are older than the TTL.
pub struct QuoteCache {
    store: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

/// Builds the cache key `"{kind}_{symbol}"`.
pub fn cache_key(kind: AssetKind, symbol: &str) -> String {
    format!("{}_{}", kind, symbol)
}

impl QuoteCache {
    /// Creates a new cache with the given time-to-live for entries.
    pub fn new(ttl: Duration) -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns the cached record for `key`, or `None` if missing or expired.
    pub fn get(&self, key: &str) -> Option<QuoteRecord> {
        let store = self.lock();
        let entry = store.get(key)?;
        if entry.captured_at.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.record.clone())
    }

    /// Inserts or overwrites an entry, stamping it with the current instant.
    pub fn set(&self, key: String, record: QuoteRecord) {
        self.lock().insert(
            key,
            CacheEntry {
                record,
                captured_at: Instant::now(),
            },
        );
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes all entries from the cache.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
