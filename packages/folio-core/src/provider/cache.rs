//! Time-boxed caching of provider responses.

use super::{MarketDataProvider, RequestPacer, RetryPolicy};
use crate::prices::PriceSeries;
use crate::scoring::Fundamentals;
use crate::Result;
use moka::sync::Cache;
use std::time::Duration;
use tracing::debug;

/// Upper bound on cached responses.
pub const DEFAULT_CACHE_CAPACITY: u64 = 1000;

/// Provider call being cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    DailyPrices,
    Fundamentals,
}

#[derive(Debug, Clone)]
enum Cached {
    Prices(PriceSeries),
    Fundamentals(Fundamentals),
}

/// Wraps a provider with a TTL cache keyed by (ticker, endpoint), call
/// pacing and a retry policy.
///
/// Only cache misses reach the inner provider, so only they are paced.
pub struct CachingProvider<P> {
    inner: P,
    cache: Cache<(String, Endpoint), Cached>,
    pacer: RequestPacer,
    retry: RetryPolicy,
}

impl<P: MarketDataProvider> CachingProvider<P> {
    pub fn new(inner: P, ttl: Duration, retry: RetryPolicy) -> Self {
        Self {
            inner,
            cache: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(DEFAULT_CACHE_CAPACITY)
                .build(),
            pacer: RequestPacer::disabled(),
            retry,
        }
    }

    /// Space calls to the inner provider at least `interval` apart.
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.pacer = RequestPacer::new(interval);
        self
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Number of live cache entries, after pending evictions are applied.
    pub fn cached_entries(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    fn key(symbol: &str, endpoint: Endpoint) -> (String, Endpoint) {
        (symbol.trim().to_uppercase(), endpoint)
    }
}

impl<P: MarketDataProvider> MarketDataProvider for CachingProvider<P> {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn daily_prices(&mut self, symbol: &str) -> Result<PriceSeries> {
        let key = Self::key(symbol, Endpoint::DailyPrices);
        if let Some(Cached::Prices(series)) = self.cache.get(&key) {
            debug!(symbol = %key.0, "price cache hit");
            return Ok(series);
        }

        let (inner, pacer) = (&mut self.inner, &mut self.pacer);
        let series = self.retry.run(|| {
            pacer.pace();
            inner.daily_prices(symbol)
        })?;
        self.cache.insert(key, Cached::Prices(series.clone()));
        Ok(series)
    }

    fn fundamentals(&mut self, symbol: &str) -> Result<Fundamentals> {
        let key = Self::key(symbol, Endpoint::Fundamentals);
        if let Some(Cached::Fundamentals(data)) = self.cache.get(&key) {
            debug!(symbol = %key.0, "fundamentals cache hit");
            return Ok(data);
        }

        let (inner, pacer) = (&mut self.inner, &mut self.pacer);
        let data = self.retry.run(|| {
            pacer.pace();
            inner.fundamentals(symbol)
        })?;
        self.cache.insert(key, Cached::Fundamentals(data.clone()));
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::testing::ScriptedProvider;
    use crate::provider::Backoff;
    use crate::Error;
    use std::thread;
    use std::time::Instant;

    const SHORT_TTL: Duration = Duration::from_millis(50);

    #[test]
    fn test_caching_provider_hits_inner_once() {
        let inner = ScriptedProvider::new().with_prices("AAPL", &[100.0, 101.0]);
        let mut provider =
            CachingProvider::new(inner, Duration::from_secs(3600), RetryPolicy::none());

        let first = provider.daily_prices("AAPL").unwrap();
        let second = provider.daily_prices("aapl").unwrap();

        assert_eq!(first, second);
        assert_eq!(provider.inner().price_calls(), 1);
    }

    #[test]
    fn test_caching_provider_refetches_after_expiry() {
        let inner = ScriptedProvider::new().with_prices("AAPL", &[100.0, 101.0]);
        let mut provider = CachingProvider::new(inner, SHORT_TTL, RetryPolicy::none());

        provider.daily_prices("AAPL").unwrap();
        thread::sleep(SHORT_TTL * 3);
        provider.daily_prices("AAPL").unwrap();

        assert_eq!(provider.inner().price_calls(), 2);
    }

    #[test]
    fn test_expired_entries_are_evicted() {
        let mut inner = ScriptedProvider::new();
        for i in 0..200 {
            inner = inner.with_prices(&format!("SYM{}", i), &[10.0, 11.0]);
        }
        let ttl = Duration::from_millis(300);
        let mut provider = CachingProvider::new(inner, ttl, RetryPolicy::none());

        for i in 0..200 {
            provider.daily_prices(&format!("SYM{}", i)).unwrap();
        }
        assert_eq!(provider.cached_entries(), 200);

        thread::sleep(ttl * 3);
        assert_eq!(provider.cached_entries(), 0);
    }

    #[test]
    fn test_caching_provider_keys_by_endpoint() {
        let inner = ScriptedProvider::new()
            .with_prices("MSFT", &[300.0, 310.0])
            .with_fundamentals(Fundamentals::new("MSFT"));
        let mut provider =
            CachingProvider::new(inner, Duration::from_secs(60), RetryPolicy::none());

        provider.daily_prices("MSFT").unwrap();
        let data = provider.fundamentals("MSFT").unwrap();
        provider.fundamentals("MSFT").unwrap();

        assert_eq!(data.symbol, "MSFT");
        assert_eq!(provider.inner().price_calls(), 1);
        assert_eq!(provider.inner().fundamentals_calls(), 1);
    }

    #[test]
    fn test_caching_provider_retries_rate_limits() {
        let inner = ScriptedProvider::new()
            .with_prices("SPY", &[400.0, 401.0])
            .rate_limited_for(2);
        let retry = RetryPolicy::new(3, Backoff::Fixed { delay_ms: 0 });
        let mut provider = CachingProvider::new(inner, Duration::from_secs(60), retry);

        assert!(provider.daily_prices("SPY").is_ok());
        assert_eq!(provider.inner().price_calls(), 3);
    }

    #[test]
    fn test_caching_provider_does_not_cache_errors() {
        let inner = ScriptedProvider::new();
        let mut provider =
            CachingProvider::new(inner, Duration::from_secs(60), RetryPolicy::none());

        assert!(matches!(provider.daily_prices("NOPE"), Err(Error::DataUnavailable(_))));
        assert!(matches!(provider.daily_prices("NOPE"), Err(Error::DataUnavailable(_))));
        assert_eq!(provider.inner().price_calls(), 2);
    }

    #[test]
    fn test_misses_are_paced_hits_are_not() {
        let inner = ScriptedProvider::new()
            .with_prices("AAA", &[1.0, 2.0])
            .with_prices("BBB", &[1.0, 2.0]);
        let interval = Duration::from_millis(40);
        let mut provider =
            CachingProvider::new(inner, Duration::from_secs(60), RetryPolicy::none())
                .with_min_interval(interval);

        let start = Instant::now();
        provider.daily_prices("AAA").unwrap();
        provider.daily_prices("AAA").unwrap();
        let after_hit = start.elapsed();
        provider.daily_prices("BBB").unwrap();

        assert!(after_hit < interval);
        assert!(start.elapsed() >= interval);
    }
}
