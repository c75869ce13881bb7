use axum::extract::{Path, State};
use axum::{Json, Router};
use axum::routing::get;
use tracing::{error, info};

use crate::errors::AppError;
use crate::routes::ApiQuery;
use crate::models::{AnalysisParams, DateRange, PriceSeries};
use crate::services;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:ticker", get(get_prices))
}

/// GET /api/prices/:ticker?start=YYYY-MM-DD&end=YYYY-MM-DD
pub async fn get_prices(
    Path(ticker): Path<String>,
    ApiQuery(params): ApiQuery<AnalysisParams>,
    State(state): State<AppState>,
) -> Result<Json<PriceSeries>, AppError> {
    let range = DateRange::resolve(params.start, params.end, chrono::Utc::now().date_naive())?;
    info!("GET /prices/{} - Getting price history ({} to {})", ticker, range.start, range.end);

    let series = services::price_service::load_series(
        state.price_provider.as_ref(),
        &state.series_cache,
        &ticker,
        range,
    )
    .await
    .map_err(|e| {
        error!("Failed to get price history for {}: {}", ticker, e);
        e
    })?;

    Ok(Json(series.as_ref().clone()))
}
