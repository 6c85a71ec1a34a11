//! Id-keyed metadata cache using moka
//!
//! Concurrent `resolve` calls for an id that is not cached yet are coalesced
//! by moka into a single evaluation of the lookup, so at most one external
//! call per id is outstanding. Entries never expire and are never evicted.

use crate::error::FetchError;
use crate::fetcher::MetadataFetcher;
use moka::future::Cache;
use reflist_core::{Metadata, ReferenceId};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of resolved ids (approximate while writes are pending)
    pub entry_count: u64,
    /// External lookups started since creation
    pub lookups: u64,
}

/// Memoized, single-flight metadata store
///
/// Cheap to clone; clones share entries and the fetcher.
#[derive(Clone)]
pub struct MetadataCache {
    inner: Cache<ReferenceId, Metadata>,
    fetcher: Arc<dyn MetadataFetcher>,
    service_url: Arc<str>,
    fetch_timeout: Option<Duration>,
    lookups: Arc<AtomicU64>,
}

impl MetadataCache {
    /// Create an empty cache backed by a fetcher
    #[must_use]
    pub fn new(fetcher: Arc<dyn MetadataFetcher>) -> Self {
        Self {
            inner: Cache::builder().build(),
            fetcher,
            service_url: Arc::from(""),
            fetch_timeout: None,
            lookups: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Base URL of item pages; the id is appended to it
    #[inline]
    #[must_use]
    pub fn with_service_url(mut self, url: &str) -> Self {
        self.service_url = Arc::from(url);
        self
    }

    /// Page URL handed to the fetcher for one id
    #[must_use]
    pub fn lookup_url(&self, id: ReferenceId) -> String {
        format!("{}{id}", self.service_url)
    }

    /// Bound each external lookup; exceeding it counts as a failure
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// Resolve metadata for an id
    ///
    /// Returns the memoized value when present. Otherwise joins the lookup
    /// already in flight for this id, or starts one. Never fails: lookup
    /// errors resolve to [`Metadata::placeholder`].
    pub async fn resolve(&self, id: ReferenceId) -> Metadata {
        let fetcher = Arc::clone(&self.fetcher);
        let lookups = Arc::clone(&self.lookups);
        let timeout = self.fetch_timeout;
        let url = self.lookup_url(id);

        self.inner
            .get_with(id, async move {
                lookups.fetch_add(1, Ordering::Relaxed);
                lookup(fetcher.as_ref(), id, &url, timeout).await
            })
            .await
    }

    /// Start resolving an id in the background
    ///
    /// Returns `None` when the id is already resolved. Starting a prefetch
    /// for an id whose lookup is in flight does not start a second lookup.
    pub fn prefetch(&self, id: ReferenceId) -> Option<JoinHandle<Metadata>> {
        if self.inner.contains_key(&id) {
            tracing::debug!(%id, "metadata already cached");
            return None;
        }
        let cache = self.clone();
        Some(tokio::spawn(async move { cache.resolve(id).await }))
    }

    /// Memoized metadata, without triggering a lookup
    #[inline]
    pub async fn peek(&self, id: ReferenceId) -> Option<Metadata> {
        self.inner.get(&id).await
    }

    /// Check if an id has been resolved
    #[inline]
    #[must_use]
    pub fn contains(&self, id: ReferenceId) -> bool {
        self.inner.contains_key(&id)
    }

    /// Get cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.inner.entry_count(),
            lookups: self.lookups.load(Ordering::Relaxed),
        }
    }
}

impl fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataCache")
            .field("service_url", &self.service_url)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

async fn lookup(
    fetcher: &dyn MetadataFetcher,
    id: ReferenceId,
    url: &str,
    timeout: Option<Duration>,
) -> Metadata {
    let fetched = match timeout {
        Some(limit) => tokio::time::timeout(limit, fetcher.fetch(id, url))
            .await
            .unwrap_or_else(|_| Err(FetchError::TimedOut)),
        None => fetcher.fetch(id, url).await,
    };

    match fetched {
        Ok(found) => {
            tracing::debug!(%id, "metadata resolved");
            found.into_metadata()
        }
        Err(err) => {
            tracing::warn!(%id, error = %err, "metadata lookup failed, using placeholder");
            Metadata::placeholder()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::{FetchedMetadata, MockMetadataFetcher};
    use async_trait::async_trait;
    use mockall::predicate::{always, eq};
    use std::sync::atomic::AtomicUsize;

    /// Fetcher that takes a while and counts its calls
    #[derive(Default)]
    struct SlowFetcher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MetadataFetcher for SlowFetcher {
        async fn fetch(&self, id: ReferenceId, _url: &str) -> Result<FetchedMetadata, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(FetchedMetadata::new(format!("item {id}"), format!("https://img/{id}.png")))
        }
    }

    #[tokio::test]
    async fn concurrent_resolves_share_one_lookup() {
        let fetcher = Arc::new(SlowFetcher::default());
        let cache = MetadataCache::new(fetcher.clone());
        let id = ReferenceId::new(7);

        let (a, b) = tokio::join!(cache.resolve(id), cache.resolve(id));

        assert_eq!(a, b);
        assert_eq!(a.title, "item 7");
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().lookups, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_tasks_share_one_lookup() {
        let fetcher = Arc::new(SlowFetcher::default());
        let cache = MetadataCache::new(fetcher.clone());
        let id = ReferenceId::new(11);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.resolve(id).await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().title, "item 11");
        }

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_ids_are_looked_up_separately() {
        let fetcher = Arc::new(SlowFetcher::default());
        let cache = MetadataCache::new(fetcher.clone());

        let (a, b) = tokio::join!(
            cache.resolve(ReferenceId::new(1)),
            cache.resolve(ReferenceId::new(2))
        );

        assert_eq!(a.title, "item 1");
        assert_eq!(b.title, "item 2");
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn resolved_value_is_memoized() {
        let mut fetcher = MockMetadataFetcher::new();
        fetcher
            .expect_fetch()
            .with(eq(ReferenceId::new(3)), always())
            .times(1)
            .returning(|_, _| Ok(FetchedMetadata::new("Three", "https://img/3.png")));
        let cache = MetadataCache::new(Arc::new(fetcher));

        let first = cache.resolve(ReferenceId::new(3)).await;
        let second = cache.resolve(ReferenceId::new(3)).await;

        assert_eq!(first, second);
        assert!(cache.contains(ReferenceId::new(3)));
        assert_eq!(cache.peek(ReferenceId::new(3)).await, Some(first));
    }

    #[tokio::test]
    async fn failure_resolves_to_memoized_placeholder() {
        let mut fetcher = MockMetadataFetcher::new();
        fetcher
            .expect_fetch()
            .with(eq(ReferenceId::new(9)), always())
            .times(1)
            .returning(|_, _| Err(FetchError::Network("connection refused".to_string())));
        let cache = MetadataCache::new(Arc::new(fetcher));

        let first = cache.resolve(ReferenceId::new(9)).await;
        assert!(first.is_placeholder());
        assert!(first.image_url.is_empty());

        let second = cache.resolve(ReferenceId::new(9)).await;
        assert_eq!(second, first);
        assert_eq!(cache.stats().lookups, 1);
    }

    #[tokio::test]
    async fn empty_discovery_is_placeholder() {
        let mut fetcher = MockMetadataFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|_, _| Ok(FetchedMetadata::default()));
        let cache = MetadataCache::new(Arc::new(fetcher));

        assert!(cache.resolve(ReferenceId::new(5)).await.is_placeholder());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_lookup_times_out_to_placeholder() {
        struct Stalled;

        #[async_trait]
        impl MetadataFetcher for Stalled {
            async fn fetch(
                &self,
                _id: ReferenceId,
                _url: &str,
            ) -> Result<FetchedMetadata, FetchError> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(FetchedMetadata::new("late", ""))
            }
        }

        let cache = MetadataCache::new(Arc::new(Stalled)).with_timeout(Duration::from_secs(5));
        assert!(cache.resolve(ReferenceId::new(4)).await.is_placeholder());
    }

    #[tokio::test]
    async fn prefetch_skips_cached_ids() {
        let fetcher = Arc::new(SlowFetcher::default());
        let cache = MetadataCache::new(fetcher.clone());
        let id = ReferenceId::new(21);

        assert!(cache.peek(id).await.is_none());
        let handle = cache.prefetch(id).expect("not cached yet");
        assert_eq!(handle.await.unwrap().title, "item 21");

        assert!(cache.prefetch(id).is_none());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn prefetch_joins_inflight_lookup() {
        let fetcher = Arc::new(SlowFetcher::default());
        let cache = MetadataCache::new(fetcher.clone());
        let id = ReferenceId::new(30);

        let first = cache.prefetch(id).unwrap();
        let second = cache.prefetch(id).unwrap();
        let (a, b) = (first.await.unwrap(), second.await.unwrap());

        assert_eq!(a, b);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fetcher_receives_item_page_url() {
        let mut fetcher = MockMetadataFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|id, url| *id == ReferenceId::new(42) && url == "https://shop.example/items/42")
            .times(1)
            .returning(|_, _| Ok(FetchedMetadata::new("Forty-two", "")));
        let cache =
            MetadataCache::new(Arc::new(fetcher)).with_service_url("https://shop.example/items/");

        assert_eq!(
            cache.lookup_url(ReferenceId::new(42)),
            "https://shop.example/items/42"
        );
        assert_eq!(cache.resolve(ReferenceId::new(42)).await.title, "Forty-two");
    }
}
