//! Series caching.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use stockta_core::error::DataError;
use stockta_core::traits::{DataSource, FetchRequest};
use stockta_core::types::{BarSeries, Ticker};
use tracing::debug;

/// Cache key: ticker plus lookback window in days.
pub type CacheKey = (Ticker, u32);

struct CachedSeries {
    series: BarSeries,
    fetched_at: Instant,
}

impl CachedSeries {
    fn is_fresh(&self, max_age: Option<Duration>) -> bool {
        max_age.map_or(true, |age| self.fetched_at.elapsed() <= age)
    }
}

/// In-memory cache of fetched series, owned by the caller.
///
/// Entries never expire unless a max age is set; stale entries are refetched
/// on the next [`SeriesCache::get_or_fetch`].
#[derive(Default)]
pub struct SeriesCache {
    entries: HashMap<CacheKey, CachedSeries>,
    max_age: Option<Duration>,
}

impl SeriesCache {
    /// Create a cache without expiry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache whose entries go stale after `max_age`.
    pub fn with_max_age(max_age: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            max_age: Some(max_age),
        }
    }

    fn key(request: &FetchRequest) -> CacheKey {
        (request.ticker.clone(), request.lookback_days)
    }

    /// Fresh cached series for the request, if any.
    pub fn get(&self, request: &FetchRequest) -> Option<&BarSeries> {
        self.entries
            .get(&Self::key(request))
            .filter(|entry| entry.is_fresh(self.max_age))
            .map(|entry| &entry.series)
    }

    /// Store a series for the request, replacing any previous entry.
    pub fn insert(&mut self, request: &FetchRequest, series: BarSeries) {
        self.entries.insert(
            Self::key(request),
            CachedSeries {
                series,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Return the cached series, fetching from `source` only on a miss or a
    /// stale entry. Failed fetches are not cached.
    pub async fn get_or_fetch(
        &mut self,
        source: &dyn DataSource,
        request: &FetchRequest,
    ) -> Result<&BarSeries, DataError> {
        let max_age = self.max_age;

        match self.entries.entry(Self::key(request)) {
            Entry::Occupied(entry) if entry.get().is_fresh(max_age) => {
                debug!(ticker = %request.ticker, days = request.lookback_days, "Cache hit");
                Ok(&entry.into_mut().series)
            }
            entry => {
                debug!(
                    ticker = %request.ticker,
                    days = request.lookback_days,
                    source = source.name(),
                    "Cache miss"
                );
                let cached = CachedSeries {
                    series: source.fetch(request).await?,
                    fetched_at: Instant::now(),
                };
                let slot = match entry {
                    Entry::Occupied(mut stale) => {
                        stale.insert(cached);
                        stale.into_mut()
                    }
                    Entry::Vacant(vacant) => vacant.insert(cached),
                };
                Ok(&slot.series)
            }
        }
    }

    /// Drop the entry for one request.
    pub fn invalidate(&mut self, request: &FetchRequest) -> bool {
        self.entries.remove(&Self::key(request)).is_some()
    }

    /// Drop every lookback window cached for a ticker.
    pub fn invalidate_ticker(&mut self, ticker: &Ticker) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(t, _), _| t != ticker);
        before - self.entries.len()
    }

    /// Clear all cached data.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::tests::{bars, MockSource};
    use std::sync::atomic::Ordering;

    fn request(symbol: &str, days: u32) -> FetchRequest {
        FetchRequest::new(Ticker::parse(symbol).unwrap(), days)
    }

    #[tokio::test]
    async fn test_fetches_only_on_miss() {
        let source = MockSource::returning("mock", bars(5));
        let calls = source.calls.clone();
        let mut cache = SeriesCache::new();

        let first = cache.get_or_fetch(&source, &request("AAPL", 365)).await.unwrap().len();
        let second = cache.get_or_fetch(&source, &request("aapl", 365)).await.unwrap().len();

        assert_eq!((first, second), (5, 5));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // A different window is a different key
        cache.get_or_fetch(&source, &request("AAPL", 30)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let source = MockSource::failing("mock", DataError::Transport("timeout".into()));
        let calls = source.calls.clone();
        let mut cache = SeriesCache::new();

        assert!(cache.get_or_fetch(&source, &request("FPT.VN", 365)).await.is_err());
        assert!(cache.get_or_fetch(&source, &request("FPT.VN", 365)).await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_stale_entry_is_refetched() {
        let source = MockSource::returning("mock", bars(3));
        let calls = source.calls.clone();
        let mut cache = SeriesCache::with_max_age(Duration::ZERO);

        cache.get_or_fetch(&source, &request("AAPL", 365)).await.unwrap();
        std::thread::sleep(Duration::from_millis(2));
        assert!(cache.get(&request("AAPL", 365)).is_none());

        cache.get_or_fetch(&source, &request("AAPL", 365)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidation() {
        let ticker = Ticker::parse("CTG.VN").unwrap();
        let series = BarSeries::new(ticker.clone(), bars(2));
        let mut cache = SeriesCache::new();

        cache.insert(&request("CTG.VN", 30), series.clone());
        cache.insert(&request("CTG.VN", 365), series.clone());
        cache.insert(&request("FPT.VN", 365), series);
        assert!(cache.get(&request("CTG.VN", 30)).is_some());

        assert!(cache.invalidate(&request("CTG.VN", 30)));
        assert!(!cache.invalidate(&request("CTG.VN", 30)));
        assert_eq!(cache.invalidate_ticker(&ticker), 1);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
