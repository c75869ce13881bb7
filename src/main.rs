mod app;
mod config;
mod errors;
mod external;
mod logging;
mod models;
mod routes;
mod services;
mod state;

use std::sync::Arc;
use std::time::Duration;
use anyhow::Context;
use tokio::net::TcpListener;
use crate::config::{AppConfig, ProviderKind};
use crate::external::csv_provider::CsvProvider;
use crate::external::mock::MockProvider;
use crate::external::price_provider::PriceProvider;
use crate::external::yahoofinance::YahooFinanceProvider;
use crate::logging::LoggingConfig;
use crate::state::AppState;

fn build_provider(config: &AppConfig) -> Arc<dyn PriceProvider> {
    match config.provider {
        ProviderKind::Yahoo => {
            tracing::info!("📊 Using price provider: Yahoo Finance");
            Arc::new(YahooFinanceProvider::new(config.http_timeout))
        }
        ProviderKind::Csv => {
            tracing::info!("📊 Using price provider: CSV files in {}", config.csv_data_dir.display());
            Arc::new(CsvProvider::new(config.csv_data_dir.clone()))
        }
        ProviderKind::Mock => {
            tracing::info!("📊 Using price provider: mock random walk");
            Arc::new(MockProvider::new())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    logging::init_logging(&LoggingConfig::from_env()).context("failed to initialize logging")?;

    let config = AppConfig::from_env().context("invalid configuration")?;
    let provider = build_provider(&config);
    let addr = config.bind_addr;

    let state = AppState::new(config, provider);

    if state.series_cache.is_enabled() {
        let cache = state.series_cache.clone();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(Duration::from_secs(60));
            loop {
                tick.tick().await;
                cache.cleanup_expired();
            }
        });
    }

    let app = app::create_app(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("🚀 Stockdash backend running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
