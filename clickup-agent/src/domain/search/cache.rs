//! Keyed cache of built indexes.
//!
//! Concurrent requests for the same [`FilterKey`] share one in-flight build, the finished
//! value lives for a fixed window after it is inserted and failed builds are never stored.
//! Entries are stored under a generation number so that invalidation also orphans builds
//! that are still running.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use super::traits::{Result, SearchError};
use super::types::FilterKey;

pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Distinct filter combinations kept per cache by default.
pub const DEFAULT_CAPACITY: u64 = 256;

#[derive(Clone)]
pub struct IndexCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    inner: Cache<(u64, FilterKey), V>,
    generation: Arc<AtomicU64>,
    ttl: Duration,
}

impl<V> IndexCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_CAPACITY)
    }

    /// A cache holding at most `capacity` filter combinations.
    ///
    /// Past capacity moka's admission policy may refuse new keys, which then rebuild on
    /// every request until older entries expire.
    pub fn with_capacity(ttl: Duration, capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(capacity.max(1))
            .time_to_live(ttl)
            .build();
        Self {
            inner,
            generation: Arc::default(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn current(&self, key: FilterKey) -> (u64, FilterKey) {
        (self.generation.load(Ordering::SeqCst), key)
    }

    /// Return the cached value for `key`, or run `build` to produce it.
    ///
    /// Callers arriving while a build for `key` is running await that build instead of
    /// starting their own. An error is handed to every waiting caller and not cached.
    pub async fn get_or_build<F>(&self, key: FilterKey, build: F) -> Result<V>
    where
        F: Future<Output = Result<V>>,
    {
        debug!(key = %key, "Resolving cached index");
        self.inner
            .try_get_with(self.current(key), build)
            .await
            .map_err(SearchError::BuildError)
    }

    pub async fn contains(&self, key: &FilterKey) -> bool {
        self.inner.get(&self.current(key.clone())).await.is_some()
    }

    /// Drop every entry.
    ///
    /// Builds already in flight still complete for their callers, but their results land
    /// in the previous generation and are never served again.
    pub fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.invalidate_all();
    }
}

impl<V> Default for IndexCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
