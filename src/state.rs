use std::sync::Arc;
use crate::config::AppConfig;
use crate::external::price_provider::PriceProvider;
use crate::services::series_cache::SeriesCache;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub price_provider: Arc<dyn PriceProvider>,
    pub series_cache: SeriesCache,
}

impl AppState {
    pub fn new(config: AppConfig, price_provider: Arc<dyn PriceProvider>) -> Self {
        let series_cache = SeriesCache::new(config.series_cache_ttl);
        Self {
            config: Arc::new(config),
            price_provider,
            series_cache,
        }
    }
}
