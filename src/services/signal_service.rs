use crate::models::{MovingAveragePoint, PriceSeries, Signal, SignalSnapshot, TrendBias, TrendSummary};
use crate::services::indicators::SignalError;

/// Pure threshold rule: above the average buys, below sells, on it holds.
pub fn derive_signal(latest_close: f64, latest_average: f64) -> Signal {
    if latest_close > latest_average {
        Signal::Buy
    } else if latest_close < latest_average {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

/// Signal for the most recent bar of `series`.
///
/// `averages` must be aligned with `series` (as produced by
/// `compute_moving_average`).
pub fn latest_signal(
    series: &PriceSeries,
    averages: &[MovingAveragePoint],
    window: usize,
) -> Result<SignalSnapshot, SignalError> {
    let insufficient = SignalError::InsufficientData {
        required: window,
        available: series.len(),
    };

    let latest = series.latest().ok_or(insufficient.clone())?;
    let latest_average = averages
        .last()
        .filter(|p| p.date == latest.date)
        .and_then(|p| p.average)
        .ok_or(insufficient)?;

    Ok(SignalSnapshot {
        date: latest.date,
        latest_close: latest.close,
        latest_average,
        window,
        signal: derive_signal(latest.close, latest_average),
    })
}

/// Counts how many of the last `window` closes sat below their average.
/// The bias is `Above` while fewer than half the window closed below.
pub fn trend_summary(
    series: &PriceSeries,
    averages: &[MovingAveragePoint],
    window: usize,
) -> TrendSummary {
    let start = series.len().saturating_sub(window);

    let (days_considered, days_below_average) = series.points()[start..]
        .iter()
        .zip(&averages[start.min(averages.len())..])
        .filter_map(|(p, ma)| ma.average.map(|avg| p.close < avg))
        .fold((0, 0), |(considered, below), is_below| {
            (considered + 1, below + usize::from(is_below))
        });

    let bias = if days_below_average * 2 < window {
        TrendBias::Above
    } else {
        TrendBias::Below
    };

    TrendSummary {
        days_considered,
        days_below_average,
        bias,
    }
}
