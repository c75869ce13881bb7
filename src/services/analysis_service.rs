use chrono::{Duration, NaiveDate};
use tracing::info;

use crate::errors::AppError;
use crate::models::{
    AnalysisRequest, AnalysisResponse, Candle, ChartPayload, ChartSeries, ChartType, LinePoint,
    MovingAveragePoint, PricePoint, PriceSeries, SummaryStats, VolumeBar, VolumeDirection,
    RECENT_ROWS,
};
use crate::services::indicators::compute_moving_average;
use crate::services::{price_service, signal_service};
use crate::state::AppState;

/// One fetch-compute cycle: history, moving average, signal and everything
/// the dashboard shows next to the chart.
pub async fn analyze(state: &AppState, request: &AnalysisRequest) -> Result<AnalysisResponse, AppError> {
    let series = price_service::load_series(
        state.price_provider.as_ref(),
        &state.series_cache,
        &request.ticker,
        request.range,
    )
    .await?;

    let averages = compute_moving_average(&series, request.window)?;
    let snapshot = signal_service::latest_signal(&series, &averages, request.window)?;
    let trend = signal_service::trend_summary(&series, &averages, request.window);
    let summary = summary_stats(&series).ok_or_else(|| AppError::NoDataAvailable(series.ticker().to_string()))?;

    info!(
        ticker = series.ticker(),
        window = request.window,
        points = series.len(),
        signal = %snapshot.signal,
        "Analysis complete"
    );

    Ok(AnalysisResponse {
        ticker: series.ticker().to_string(),
        range: request.range,
        window: request.window,
        message: snapshot.message(),
        signal: snapshot,
        trend,
        summary,
        recent: series.tail(RECENT_ROWS).to_vec(),
        chart: chart_payload(&series, &averages, request.window, request.chart_type),
    })
}

/// Current price, day-over-day change, last volume and the 52-week range.
/// `None` for an empty series.
pub fn summary_stats(series: &PriceSeries) -> Option<SummaryStats> {
    let latest = series.latest()?;
    let points = series.points();

    let daily_change_pct = points
        .len()
        .checked_sub(2)
        .map(|i| points[i].close)
        .map(|previous| (latest.close - previous) / previous * 100.0);

    let year_start = latest
        .date
        .checked_sub_signed(Duration::weeks(52))
        .unwrap_or(NaiveDate::MIN);
    let (year_high, year_low) = points
        .iter()
        .filter(|p| p.date >= year_start)
        .fold((f64::MIN, f64::MAX), |(high, low), p| (high.max(p.high), low.min(p.low)));

    Some(SummaryStats {
        current_price: latest.close,
        daily_change_pct,
        volume: latest.volume,
        year_high,
        year_low,
    })
}

fn volume_bar(p: &PricePoint) -> VolumeBar {
    VolumeBar {
        date: p.date,
        volume: p.volume,
        direction: if p.close >= p.open {
            VolumeDirection::Up
        } else {
            VolumeDirection::Down
        },
    }
}

pub fn chart_payload(
    series: &PriceSeries,
    averages: &[MovingAveragePoint],
    window: usize,
    chart_type: ChartType,
) -> ChartPayload {
    let points = series.points();
    let pairs = points.iter().zip(averages.iter().map(|ma| ma.average));

    let series_data = match chart_type {
        ChartType::Line => ChartSeries::Line(
            pairs
                .map(|(p, average)| LinePoint { date: p.date, close: p.close, average })
                .collect(),
        ),
        ChartType::Candlestick => ChartSeries::Candlestick(
            pairs
                .map(|(p, average)| Candle {
                    date: p.date,
                    open: p.open,
                    high: p.high,
                    low: p.low,
                    close: p.close,
                    average,
                })
                .collect(),
        ),
    };

    ChartPayload {
        title: format!("{} Stock Price with {}-day MA", series.ticker(), window),
        moving_average_label: format!("{}-day MA", window),
        series: series_data,
        volume: points.iter().map(volume_bar).collect(),
    }
}
