//! Time-bounded key-value storage for task state and cached pathways
//!
//! The service never talks to a concrete cache directly; it holds a
//! [`KeyValueStore`] trait object so an in-memory map ([`MemoryStore`]) can
//! be swapped for a networked cache without touching the orchestrator.
//!
//! Expiry is passive: reads never return an expired entry, and a background
//! sweep ([`spawn_eviction_task`]) reclaims memory on a fixed interval.

mod memory;

pub use memory::MemoryStore;

use crate::error::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Async key-value store with per-entry time-to-live
#[async_trait]
pub trait KeyValueStore<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    /// Get a value; `None` if the key is absent or its entry has expired
    async fn get(&self, key: &str) -> Result<Option<V>>;

    /// Insert or overwrite a value
    ///
    /// `ttl` of `None` applies the store's default TTL (which may be
    /// "never expires").
    async fn set(&self, key: &str, value: V, ttl: Option<Duration>) -> Result<()>;

    /// Overwrite a value only if the key currently holds a live entry
    ///
    /// Returns `false`, leaving the store untouched, when the key is absent
    /// or its entry has expired. An expired key stays expired.
    async fn replace(&self, key: &str, value: V, ttl: Option<Duration>) -> Result<bool>;

    /// Remove a key, returning whether a live entry was removed
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Insert a fresh entry with an explicit TTL
    async fn create(&self, key: &str, value: V, ttl: Duration) -> Result<()> {
        self.set(key, value, Some(ttl)).await
    }

    /// Remove expired entries, returning how many were dropped
    ///
    /// Stores that expire entries on their own keep the default no-op.
    async fn purge_expired(&self) -> Result<usize> {
        Ok(0)
    }
}

/// Source of monotonic time for expiry decisions
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current instant
    fn now(&self) -> Instant;
}

/// [`Clock`] backed by [`Instant::now`]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// [`Clock`] that only moves when told to
///
/// Useful for deterministic expiry tests; clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl ManualClock {
    /// Create a clock frozen at the current instant
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut offset = self
            .offset
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = *self
            .offset
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.origin + offset
    }
}

/// Spawn a background task that periodically purges expired entries
///
/// `on_evicted` is called with the number of removed entries whenever a
/// sweep removes at least one. The task stops when `cancel_token` fires.
pub fn spawn_eviction_task<V, F>(
    store: Arc<dyn KeyValueStore<V>>,
    interval: Duration,
    cancel_token: CancellationToken,
    on_evicted: F,
) -> tokio::task::JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
    F: Fn(usize) + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // first tick fires immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match store.purge_expired().await {
                        Ok(0) => {}
                        Ok(count) => {
                            tracing::debug!(count, "evicted expired store entries");
                            on_evicted(count);
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "store eviction sweep failed");
                        }
                    }
                }
                _ = cancel_token.cancelled() => {
                    tracing::debug!("store eviction task stopped");
                    break;
                }
            }
        }
    })
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn manual_clock_advances_shared_time() {
        let clock = ManualClock::new();
        let copy = clock.clone();
        let start = clock.now();

        copy.advance(Duration::from_secs(5));

        assert_eq!(clock.now() - start, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn eviction_task_reports_purged_entries_and_stops_on_cancel() {
        let clock = ManualClock::new();
        let store: Arc<MemoryStore<String>> =
            Arc::new(MemoryStore::with_clock(None, None, Arc::new(clock.clone())));
        store
            .set("a", "1".into(), Some(Duration::from_secs(1)))
            .await
            .unwrap();
        store
            .set("b", "2".into(), Some(Duration::from_secs(1)))
            .await
            .unwrap();
        clock.advance(Duration::from_secs(2));

        let evicted = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        let handle = spawn_eviction_task(
            store.clone() as Arc<dyn KeyValueStore<String>>,
            Duration::from_millis(10),
            cancel.clone(),
            {
                let evicted = evicted.clone();
                move |count| {
                    evicted.fetch_add(count, Ordering::SeqCst);
                }
            },
        );

        tokio::time::timeout(Duration::from_secs(2), async {
            while evicted.load(Ordering::SeqCst) < 2 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("sweep should evict both entries");

        assert_eq!(store.len().await, 0);

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("eviction task should stop after cancellation")
            .unwrap();
    }
}
