//! Time-based cache in front of a rate provider
//!
//! Monobank refreshes its list at most every few minutes and throttles
//! callers that poll faster, so repeated menu presses reuse the last good
//! answer. Failures are not cached.

use super::{CurrencyPair, FetchError, RateProvider};
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

struct Cached {
    fetched_at: Instant,
    pairs: Vec<CurrencyPair>,
}

pub struct CachedRateProvider<P> {
    inner: P,
    ttl: Duration,
    // Held across the inner fetch so concurrent callers share one request
    cached: Mutex<Option<Cached>>,
}

impl<P: RateProvider> CachedRateProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cached: Mutex::new(None),
        }
    }
}

#[async_trait]
impl<P: RateProvider> RateProvider for CachedRateProvider<P> {
    async fn fetch_pairs(&self) -> Result<Vec<CurrencyPair>, FetchError> {
        let mut cached = self.cached.lock().await;
        if let Some(entry) = cached.as_ref() {
            if entry.fetched_at.elapsed() < self.ttl {
                tracing::debug!("Serving currency rates from cache");
                return Ok(entry.pairs.clone());
            }
        }

        let pairs = self.inner.fetch_pairs().await?;
        *cached = Some(Cached {
            fetched_at: Instant::now(),
            pairs: pairs.clone(),
        });
        Ok(pairs)
    }
}
