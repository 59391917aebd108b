//! In-memory [`KeyValueStore`] with TTL expiry and optional capacity limit.

use super::{Clock, KeyValueStore, SystemClock};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    /// None = never expires
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| now < deadline)
    }
}

/// Process-local key-value store
///
/// Entries live in a `HashMap` behind a tokio `RwLock`. Writes to distinct
/// keys never block each other for longer than the map update itself.
pub struct MemoryStore<V> {
    entries: RwLock<HashMap<String, Entry<V>>>,
    default_ttl: Option<Duration>,
    max_entries: Option<usize>,
    clock: Arc<dyn Clock>,
}

impl<V> MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a store using the system clock
    ///
    /// * `default_ttl` - lifetime applied when `set` is called without a TTL
    ///   (None = entries never expire)
    /// * `max_entries` - capacity limit (None = unbounded)
    pub fn new(default_ttl: Option<Duration>, max_entries: Option<usize>) -> Self {
        Self::with_clock(default_ttl, max_entries, Arc::new(SystemClock))
    }

    /// Create a store reading time from `clock`
    pub fn with_clock(
        default_ttl: Option<Duration>,
        max_entries: Option<usize>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
            max_entries,
            clock,
        }
    }

    /// Number of live (unexpired) entries
    pub async fn len(&self) -> usize {
        let now = self.clock.now();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    /// Whether the store holds no live entries
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl<V> KeyValueStore<V> for MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Result<Option<V>> {
        let now = self.clock.now();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: V, ttl: Option<Duration>) -> Result<()> {
        let now = self.clock.now();
        let expires_at = ttl.or(self.default_ttl).map(|ttl| now + ttl);
        let mut entries = self.entries.write().await;

        if let Some(capacity) = self.max_entries {
            let replaces_live = entries.get(key).is_some_and(|entry| entry.is_live(now));
            if !replaces_live && entries.len() >= capacity {
                entries.retain(|_, entry| entry.is_live(now));
                if entries.len() >= capacity {
                    tracing::warn!(capacity, key, "store at capacity, rejecting insert");
                    return Err(Error::StoreFull { capacity });
                }
            }
        }

        entries.insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn replace(&self, key: &str, value: V, ttl: Option<Duration>) -> Result<bool> {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(entry) if entry.is_live(now) => {
                *entry = Entry {
                    value,
                    expires_at: ttl.or(self.default_ttl).map(|ttl| now + ttl),
                };
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let now = self.clock.now();
        let removed = self.entries.write().await.remove(key);
        Ok(removed.is_some_and(|entry| entry.is_live(now)))
    }

    async fn purge_expired(&self) -> Result<usize> {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        Ok(before - entries.len())
    }
}
