use crate::ports::outbound::WebSearchService;
use crate::shared::Result;
use crate::vulnerability_scanning::domain::{ScanTarget, WebHit};
use crate::vulnerability_scanning::services::WebHitFilter;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CachedHits {
    hits: Vec<WebHit>,
    fetched_at: Instant,
}

/// CachingWebSearch wraps a WebSearchService and caches its hits per query.
///
/// Devices sharing brand, model and version produce the same query, so a
/// batch over a homogeneous fleet searches once. Entries expire after `ttl`.
/// Failures are never cached.
pub struct CachingWebSearch<W: ?Sized> {
    inner: Arc<W>,
    ttl: Duration,
    cache: DashMap<String, CachedHits>,
}

impl<W: WebSearchService + ?Sized> CachingWebSearch<W> {
    pub fn new(inner: Arc<W>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cache: DashMap::new(),
        }
    }

    #[cfg(test)]
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

#[async_trait]
impl<W: WebSearchService + ?Sized> WebSearchService for CachingWebSearch<W> {
    async fn search_vulnerabilities(&self, target: &ScanTarget) -> Result<Vec<WebHit>> {
        let key = WebHitFilter::build_query(target).to_lowercase();

        if let Some(cached) = self.cache.get(&key) {
            if cached.fetched_at.elapsed() < self.ttl {
                tracing::debug!(device = %target.label(), "Web search cache hit");
                return Ok(cached.hits.clone());
            }
        }
        // Drop an expired entry outside the read guard above
        self.cache
            .remove_if(&key, |_, cached| cached.fetched_at.elapsed() >= self.ttl);

        let hits = self.inner.search_vulnerabilities(target).await?;
        self.cache.insert(
            key,
            CachedHits {
                hits: hits.clone(),
                fetched_at: Instant::now(),
            },
        );
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::VulnTrackError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSearch {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingSearch {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl WebSearchService for CountingSearch {
        async fn search_vulnerabilities(&self, target: &ScanTarget) -> Result<Vec<WebHit>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(VulnTrackError::external("Mock search", "down").into());
            }
            Ok(vec![WebHit {
                title: format!("{} advisory", target.model),
                url: "https://example.com".to_string(),
                description: String::new(),
            }])
        }
    }

    fn target(version: &str) -> ScanTarget {
        ScanTarget::new("Cisco", "ASA 5506-X", version).unwrap()
    }

    #[tokio::test]
    async fn test_same_query_hits_cache() {
        let inner = Arc::new(CountingSearch::new(false));
        let cache = CachingWebSearch::new(Arc::clone(&inner), Duration::from_secs(60));

        cache.search_vulnerabilities(&target("9.8")).await.unwrap();
        let hits = cache.search_vulnerabilities(&target("9.8")).await.unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.cache_size(), 1);
    }

    #[tokio::test]
    async fn test_different_versions_are_separate_entries() {
        let inner = Arc::new(CountingSearch::new(false));
        let cache = CachingWebSearch::new(Arc::clone(&inner), Duration::from_secs(60));

        cache.search_vulnerabilities(&target("9.8")).await.unwrap();
        cache.search_vulnerabilities(&target("9.16")).await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.cache_size(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_refetched() {
        let inner = Arc::new(CountingSearch::new(false));
        let cache = CachingWebSearch::new(Arc::clone(&inner), Duration::from_secs(60));

        cache.search_vulnerabilities(&target("9.8")).await.unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;
        cache.search_vulnerabilities(&target("9.8")).await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let inner = Arc::new(CountingSearch::new(true));
        let cache = CachingWebSearch::new(Arc::clone(&inner), Duration::from_secs(60));

        assert!(cache.search_vulnerabilities(&target("9.8")).await.is_err());
        assert!(cache.search_vulnerabilities(&target("9.8")).await.is_err());

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.cache_size(), 0);
    }
}
