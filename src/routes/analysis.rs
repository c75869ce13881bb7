use axum::extract::{Path, State};
use axum::{Json, Router};
use axum::routing::get;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::routes::ApiQuery;
use crate::models::{
    AnalysisParams, AnalysisRequest, AnalysisResponse, DateRange, MovingAveragePoint,
    SignalResponse, MAX_WINDOW,
};
use crate::services::indicators::compute_moving_average;
use crate::services::{analysis_service, price_service, signal_service};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:ticker", get(get_analysis))
        .route("/:ticker/moving-average", get(get_moving_average))
        .route("/:ticker/signal", get(get_signal))
}

/// Applies defaults and validates the query string.
fn resolve_request(
    ticker: String,
    params: AnalysisParams,
    state: &AppState,
) -> Result<AnalysisRequest, AppError> {
    let range = DateRange::resolve(params.start, params.end, chrono::Utc::now().date_naive())?;

    let window = params.window.unwrap_or(state.config.default_window);
    if !(1..=MAX_WINDOW).contains(&window) {
        warn!("Invalid window: {}. Must be between 1 and {}.", window, MAX_WINDOW);
        return Err(AppError::Validation(format!(
            "Invalid window. Must be between 1 and {} days.",
            MAX_WINDOW
        )));
    }

    Ok(AnalysisRequest {
        ticker,
        range,
        window,
        chart_type: params.chart_type.unwrap_or_default(),
    })
}

fn log_failure(ticker: &str, e: &AppError) {
    match e {
        AppError::Network(_) => error!("Analysis failed for {}: {}", ticker, e),
        _ => warn!("Analysis rejected for {}: {}", ticker, e),
    }
}

/// GET /api/analysis/:ticker?start&end&window&chart_type
///
/// Signal, trend, summary panel, recent bars and chart data in one response.
pub async fn get_analysis(
    Path(ticker): Path<String>,
    ApiQuery(params): ApiQuery<AnalysisParams>,
    State(state): State<AppState>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let request = resolve_request(ticker, params, &state)?;
    info!(
        "GET /analysis/{} - window={}, chart_type={:?}, {} to {}",
        request.ticker, request.window, request.chart_type, request.range.start, request.range.end
    );

    let response = analysis_service::analyze(&state, &request).await.map_err(|e| {
        log_failure(&request.ticker, &e);
        e
    })?;

    Ok(Json(response))
}

/// GET /api/analysis/:ticker/moving-average?start&end&window
pub async fn get_moving_average(
    Path(ticker): Path<String>,
    ApiQuery(params): ApiQuery<AnalysisParams>,
    State(state): State<AppState>,
) -> Result<Json<Vec<MovingAveragePoint>>, AppError> {
    let request = resolve_request(ticker, params, &state)?;
    info!("GET /analysis/{}/moving-average - window={}", request.ticker, request.window);

    let result = async {
        let series = price_service::load_series(
            state.price_provider.as_ref(),
            &state.series_cache,
            &request.ticker,
            request.range,
        )
        .await?;
        Ok::<_, AppError>(compute_moving_average(&series, request.window)?)
    }
    .await
    .map_err(|e| {
        log_failure(&request.ticker, &e);
        e
    })?;

    Ok(Json(result))
}

/// GET /api/analysis/:ticker/signal?start&end&window
pub async fn get_signal(
    Path(ticker): Path<String>,
    ApiQuery(params): ApiQuery<AnalysisParams>,
    State(state): State<AppState>,
) -> Result<Json<SignalResponse>, AppError> {
    let request = resolve_request(ticker, params, &state)?;
    info!("GET /analysis/{}/signal - window={}", request.ticker, request.window);

    let result = async {
        let series = price_service::load_series(
            state.price_provider.as_ref(),
            &state.series_cache,
            &request.ticker,
            request.range,
        )
        .await?;
        let averages = compute_moving_average(&series, request.window)?;
        let snapshot = signal_service::latest_signal(&series, &averages, request.window)?;

        Ok::<_, AppError>(SignalResponse {
            ticker: series.ticker().to_string(),
            message: snapshot.message(),
            snapshot,
        })
    }
    .await
    .map_err(|e| {
        log_failure(&request.ticker, &e);
        e
    })?;

    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::app::create_app;
    use crate::config::AppConfig;
    use crate::external::csv_provider::CsvProvider;
    use crate::external::mock::MockProvider;
    use crate::external::price_provider::PriceProvider;
    use crate::state::AppState;

    fn app_with(provider: Arc<dyn PriceProvider>) -> axum::Router {
        create_app(AppState::new(AppConfig::default(), provider))
    }

    async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_analysis_returns_signal_summary_and_chart() {
        let app = app_with(Arc::new(MockProvider::new()));
        let (status, body) = get_json(
            app,
            "/api/analysis/aapl?start=2024-01-01&end=2024-04-01&window=20&chart_type=candle",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ticker"], "AAPL");
        assert_eq!(body["window"], 20);
        assert!(["BUY", "SELL", "HOLD"].contains(&body["signal"]["signal"].as_str().unwrap()));
        assert_eq!(body["recent"].as_array().unwrap().len(), 5);
        assert_eq!(body["chart"]["series"]["chart_type"], "candlestick");
        assert_eq!(body["chart"]["title"], "AAPL Stock Price with 20-day MA");

        let points = body["chart"]["series"]["points"].as_array().unwrap();
        assert!(points[0]["average"].is_null());
        assert!(points[19]["average"].is_number());
    }

    #[tokio::test]
    async fn test_signal_endpoint_includes_message() {
        let app = app_with(Arc::new(MockProvider::new()));
        let (status, body) = get_json(app, "/api/analysis/MSFT/signal?start=2024-01-01&end=2024-03-01&window=10").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ticker"], "MSFT");
        assert_eq!(body["window"], 10);
        assert!(body["message"].as_str().unwrap().contains("10-day MA"));
    }

    #[tokio::test]
    async fn test_moving_average_endpoint_is_aligned() {
        let app = app_with(Arc::new(MockProvider::new()));
        let (status, body) = get_json(
            app,
            "/api/analysis/MSFT/moving-average?start=2024-01-01&end=2024-02-01&window=5",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let points = body.as_array().unwrap();
        // 23 weekdays in January 2024
        assert_eq!(points.len(), 23);
        assert_eq!(points.iter().filter(|p| p["average"].is_null()).count(), 4);
    }

    #[tokio::test]
    async fn test_short_range_is_insufficient_data() {
        let app = app_with(Arc::new(MockProvider::new()));
        let (status, body) = get_json(app, "/api/analysis/AAPL?start=2024-01-01&end=2024-01-10&window=30").await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "insufficient_data");
    }

    #[tokio::test]
    async fn test_invalid_window_and_range_are_rejected() {
        let app = app_with(Arc::new(MockProvider::new()));
        let (status, body) = get_json(app.clone(), "/api/analysis/AAPL?window=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation");

        let (status, _) = get_json(app.clone(), "/api/analysis/AAPL?window=500").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get_json(app, "/api/analysis/AAPL?start=2024-02-01&end=2024-01-01").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_query_is_json_validation_error() {
        let app = app_with(Arc::new(MockProvider::new()));

        for uri in [
            "/api/analysis/AAPL?start=2024-13-45",
            "/api/analysis/AAPL?window=-1",
            "/api/analysis/AAPL?chart_type=bar",
            "/api/analysis/AAPL/signal?window=abc",
            "/api/analysis/AAPL/moving-average?end=yesterday",
            "/api/prices/AAPL?start=2024-02-30",
        ] {
            let (status, body) = get_json(app.clone(), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["error"], "validation", "{}", uri);
            assert!(body["message"].as_str().unwrap().contains("query string"), "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_end_date_near_min_is_rejected() {
        let app = app_with(Arc::new(MockProvider::new()));
        let end = chrono::NaiveDate::MIN + chrono::Duration::days(1);

        let (status, body) = get_json(app.clone(), &format!("/api/prices/AAPL?end={}", end)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation");

        let (status, _) = get_json(app, &format!("/api/analysis/AAPL?end={}", end)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_ticker_is_reported() {
        let provider = CsvProvider::new(std::env::temp_dir().join("stockdash-empty-data-dir"));
        let app = app_with(Arc::new(provider));
        let (status, body) = get_json(app.clone(), "/api/analysis/NOPE?window=5").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "invalid_ticker");

        let (status, body) = get_json(app, "/api/analysis/%24%24%24").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "invalid_ticker");
    }

    #[tokio::test]
    async fn test_empty_range_is_no_data() {
        let app = app_with(Arc::new(MockProvider::new()));
        // A weekend only
        let (status, body) = get_json(app, "/api/prices/AAPL?start=2024-01-06&end=2024-01-08").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "no_data");
    }

    #[tokio::test]
    async fn test_prices_endpoint_returns_series() {
        let app = app_with(Arc::new(MockProvider::new()));
        let (status, body) = get_json(app, "/api/prices/aapl?start=2024-01-01&end=2024-01-06").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ticker"], "AAPL");
        assert_eq!(body["points"].as_array().unwrap().len(), 5);
    }
}
