use std::sync::{Arc, LazyLock};
use regex::Regex;
use tracing::{error, info, warn};

use crate::errors::{self, AppError};
use crate::external::price_provider::{ExternalPricePoint, PriceProvider, PriceProviderError};
use crate::models::{DateRange, PricePoint, PriceSeries};
use crate::services::series_cache::SeriesCache;

static TICKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\^?[A-Z0-9][A-Z0-9.\-=]{0,14}$").expect("ticker pattern compiles")
});

/// Trims and upper-cases a user supplied ticker, rejecting anything that
/// cannot be a symbol.
pub fn normalize_ticker(raw: &str) -> Result<String, AppError> {
    let ticker = raw.trim().to_uppercase();
    if TICKER_RE.is_match(&ticker) {
        Ok(ticker)
    } else {
        Err(AppError::InvalidTicker(raw.trim().to_string()))
    }
}

/// Drops bars with unusable prices, orders by date and keeps the last bar seen for a date.
pub fn clean_points(raw: Vec<ExternalPricePoint>) -> Vec<PricePoint> {
    let mut points: Vec<PricePoint> = raw
        .into_iter()
        .map(|p| PricePoint::new(p.date, p.open, p.high, p.low, p.close, p.volume))
        .filter(PricePoint::has_valid_prices)
        .collect();

    // Stable sort keeps provider order within a date, so the later bar wins below
    points.sort_by_key(|p| p.date);

    let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
    for point in points {
        match deduped.last_mut() {
            Some(last) if last.date == point.date => *last = point,
            _ => deduped.push(point),
        }
    }
    deduped
}

/// Fetches, cleans and validates the history for `ticker` over `range`,
/// serving from the cache when possible.
pub async fn load_series(
    provider: &dyn PriceProvider,
    cache: &SeriesCache,
    ticker: &str,
    range: DateRange,
) -> Result<Arc<PriceSeries>, AppError> {
    let ticker = normalize_ticker(ticker)?;

    if let Some(series) = cache.get(&ticker, range) {
        info!("✓ Serving {} ({} to {}) from cache", ticker, range.start, range.end);
        return Ok(series);
    }

    let raw = provider
        .fetch_daily_history(&ticker, range.start, range.end)
        .await
        .map_err(|e| {
            match &e {
                PriceProviderError::RateLimited => warn!("Rate limited by {} when fetching {}", provider.name(), ticker),
                PriceProviderError::NotFound => warn!("Ticker {} not found by {}", ticker, provider.name()),
                _ => error!("Failed to fetch {} from {}: {}", ticker, provider.name(), e),
            }
            errors::from_provider(&ticker, e)
        })?;

    let fetched = raw.len();
    let points = clean_points(raw);
    if points.is_empty() {
        return Err(AppError::NoDataAvailable(ticker));
    }
    if points.len() < fetched {
        info!("Dropped {} unusable bars for {}", fetched - points.len(), ticker);
    }

    let series = Arc::new(PriceSeries::new(ticker, points)?);
    cache.insert(range, series.clone());

    info!(
        "📈 Loaded {} bars for {} from {} ({} to {})",
        series.len(),
        series.ticker(),
        provider.name(),
        range.start,
        range.end
    );

    Ok(series)
}
