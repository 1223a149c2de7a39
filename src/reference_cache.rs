//! Shared cache for the reference table.
//!
//! The table is loaded once from its provider and handed out as an
//! `Arc<ReferenceTable>`. Clones of the cache share the same slot via
//! `Arc<RwLock<>>`, so every request sees the same table until it expires or
//! is invalidated.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::error::LoadError;
use crate::provider::ReferenceProvider;
use crate::reference::{self, ReferenceTable};

/// Cache of the reference table with an explicit lifecycle.
///
/// Without a TTL the table lives until [`ReferenceCache::invalidate`] is
/// called. A failed load leaves the cache empty so the next call retries.
///
/// # Example
///
/// ```no_run
/// use county_zips::{CsvFileProvider, ReferenceCache};
///
/// #[tokio::main]
/// async fn main() {
///     let cache = ReferenceCache::new(CsvFileProvider::from_env());
///
///     // Slow path on first use, fast path afterwards
///     let table = cache.get_or_load().await.unwrap();
///     println!("{} counties", table.counties().len());
/// }
/// ```
#[derive(Clone)]
pub struct ReferenceCache {
    provider: Arc<dyn ReferenceProvider>,
    ttl: Option<Duration>,
    inner: Arc<RwLock<Option<CachedTable>>>,
}

struct CachedTable {
    table: Arc<ReferenceTable>,
    loaded_at: Instant,
}

impl CachedTable {
    fn is_fresh(&self, ttl: Option<Duration>) -> bool {
        ttl.is_none_or(|ttl| self.loaded_at.elapsed() < ttl)
    }
}

impl ReferenceCache {
    /// Cache that keeps the table for the process lifetime
    pub fn new(provider: impl ReferenceProvider + 'static) -> Self {
        Self::from_arc(Arc::new(provider), None)
    }

    /// Cache that reloads the table once it is older than `ttl`
    pub fn with_ttl(provider: impl ReferenceProvider + 'static, ttl: Duration) -> Self {
        Self::from_arc(Arc::new(provider), Some(ttl))
    }

    pub fn from_arc(provider: Arc<dyn ReferenceProvider>, ttl: Option<Duration>) -> Self {
        Self {
            provider,
            ttl,
            inner: Arc::new(RwLock::new(None)),
        }
    }

    /// Cached table if loaded and still fresh (read lock only)
    pub async fn get(&self) -> Option<Arc<ReferenceTable>> {
        let cache = self.inner.read().await;
        cache
            .as_ref()
            .filter(|c| c.is_fresh(self.ttl))
            .map(|c| Arc::clone(&c.table))
    }

    /// Cached table, loading it from the provider when missing or stale.
    ///
    /// Loading holds the write lock and re-checks first, so callers racing on
    /// an empty cache trigger a single load.
    pub async fn get_or_load(&self) -> Result<Arc<ReferenceTable>, LoadError> {
        if let Some(table) = self.get().await {
            return Ok(table);
        }

        let mut cache = self.inner.write().await;

        if let Some(cached) = cache.as_ref()
            && cached.is_fresh(self.ttl)
        {
            tracing::debug!("Reference table loaded by another caller");
            return Ok(Arc::clone(&cached.table));
        }

        tracing::info!("Loading reference table...");
        let provider = Arc::clone(&self.provider);
        let load = move || reference::load_reference(provider.as_ref());
        let table = tokio::task::spawn_blocking(load)
            .await
            .map_err(|e| LoadError::Provider(format!("reference load task failed: {}", e)))??;

        let table = Arc::new(table);
        *cache = Some(CachedTable {
            table: Arc::clone(&table),
            loaded_at: Instant::now(),
        });

        Ok(table)
    }

    /// Drop the cached table; the next `get_or_load` reloads it
    pub async fn invalidate(&self) {
        let mut cache = self.inner.write().await;
        tracing::info!("Invalidating reference table cache");
        *cache = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticProvider;
    use crate::types::RawRecord;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: Arc<AtomicUsize>,
    }

    impl ReferenceProvider for CountingProvider {
        fn fetch_all_records(&self) -> Result<Vec<RawRecord>, LoadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![RawRecord::new("90001", "Los Angeles", "California")])
        }
    }

    fn counting() -> (CountingProvider, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            CountingProvider {
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }

    #[tokio::test]
    async fn test_cache_creation() {
        let cache = ReferenceCache::new(StaticProvider::default());
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn test_loads_once() {
        let (provider, calls) = counting();
        let cache = ReferenceCache::new(provider);

        let a = cache.get_or_load().await.unwrap();
        let b = cache.clone().get_or_load().await.unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidation_reloads() {
        let (provider, calls) = counting();
        let cache = ReferenceCache::new(provider);

        cache.get_or_load().await.unwrap();
        cache.invalidate().await;
        assert!(cache.get().await.is_none());

        cache.get_or_load().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_expired_ttl_reloads() {
        let (provider, calls) = counting();
        let cache = ReferenceCache::with_ttl(provider, Duration::ZERO);

        cache.get_or_load().await.unwrap();
        assert!(cache.get().await.is_none());

        cache.get_or_load().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_load_not_cached() {
        let cache = ReferenceCache::new(StaticProvider::default());

        assert!(matches!(cache.get_or_load().await, Err(LoadError::Empty)));
        assert!(cache.get().await.is_none());
    }
}
