use crate::external::price_provider::{ExternalPricePoint, PriceProvider, PriceProviderError};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generates a deterministic random walk per ticker, weekdays only.
/// Useful for demos and for running without network access.
pub struct MockProvider {
    start_price: f64,
}

impl MockProvider {
    pub fn new() -> Self {
        Self { start_price: 100.0 }
    }

    fn seed_for(ticker: &str) -> u64 {
        // FNV-1a, stable across runs unlike the std hasher
        ticker.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |hash, b| {
            (hash ^ b as u64).wrapping_mul(0x0100_0000_01b3)
        })
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceProvider for MockProvider {
    async fn fetch_daily_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
        let mut rng = StdRng::seed_from_u64(Self::seed_for(ticker));
        let mut points = Vec::new();
        let mut close = self.start_price;

        for date in start.iter_days().take_while(|d| *d < end) {
            if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                continue;
            }

            let open = close;
            close = (close * (1.0 + (rng.random::<f64>() - 0.5) * 0.04)).max(1.0);
            let spread = close * rng.random::<f64>() * 0.01;

            points.push(ExternalPricePoint {
                date,
                open,
                high: open.max(close) + spread,
                low: (open.min(close) - spread).max(0.5),
                close,
                volume: rng.random_range(500_000..5_000_000),
            });
        }

        Ok(points)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_is_deterministic_and_skips_weekends() {
        let provider = MockProvider::new();
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(); // Monday
        let end = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        let first = provider.fetch_daily_history("AAPL", start, end).await.unwrap();
        let second = provider.fetch_daily_history("AAPL", start, end).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 10);
        assert!(first.iter().all(|p| p.low <= p.open.min(p.close) && p.high >= p.open.max(p.close)));
        assert!(first.iter().all(|p| p.close > 0.0));
    }

    #[tokio::test]
    async fn test_mock_empty_range() {
        let provider = MockProvider::new();
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let points = provider.fetch_daily_history("AAPL", day, day).await.unwrap();
        assert!(points.is_empty());
    }
}
