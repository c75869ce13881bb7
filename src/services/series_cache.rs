use std::sync::Arc;
use std::time::Duration;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::models::{DateRange, PriceSeries};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SeriesKey {
    ticker: String,
    range: DateRange,
}

#[derive(Debug, Clone)]
struct CachedSeries {
    fetched_at: DateTime<Utc>,
    series: Arc<PriceSeries>,
}

/// Thread-safe cache of recently fetched price series.
/// Repeated requests for the same ticker and range within the TTL skip the provider.
#[derive(Clone)]
pub struct SeriesCache {
    cache: Arc<DashMap<SeriesKey, CachedSeries>>,
    ttl: chrono::Duration,
}

impl SeriesCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(DashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::zero()),
        }
    }

    /// A zero TTL turns the cache off.
    pub fn is_enabled(&self) -> bool {
        self.ttl > chrono::Duration::zero()
    }

    pub fn get(&self, ticker: &str, range: DateRange) -> Option<Arc<PriceSeries>> {
        self.get_at(ticker, range, Utc::now())
    }

    fn get_at(&self, ticker: &str, range: DateRange, now: DateTime<Utc>) -> Option<Arc<PriceSeries>> {
        if !self.is_enabled() {
            return None;
        }

        let key = SeriesKey { ticker: ticker.to_string(), range };
        if let Some(entry) = self.cache.get(&key) {
            if now < entry.fetched_at + self.ttl {
                return Some(entry.series.clone());
            }
            drop(entry); // release the read lock before removing
            self.cache.remove(&key);
        }
        None
    }

    pub fn insert(&self, range: DateRange, series: Arc<PriceSeries>) {
        self.insert_at(range, series, Utc::now());
    }

    fn insert_at(&self, range: DateRange, series: Arc<PriceSeries>, fetched_at: DateTime<Utc>) {
        if !self.is_enabled() {
            return;
        }

        let key = SeriesKey { ticker: series.ticker().to_string(), range };
        self.cache.insert(key, CachedSeries { fetched_at, series });
    }

    /// Drops every entry whose TTL has elapsed
    pub fn cleanup_expired(&self) {
        let now = Utc::now();
        let ttl = self.ttl;
        self.cache.retain(|_, entry| now < entry.fetched_at + ttl);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.cache.len()
    }
}
