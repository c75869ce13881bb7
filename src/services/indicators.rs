use thiserror::Error;

use crate::models::{MovingAveragePoint, PriceSeries};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignalError {
    #[error("moving average window must be positive, got {0}")]
    InvalidWindow(usize),

    #[error("need at least {required} price points, have {available}")]
    InsufficientData { required: usize, available: usize },
}

/// Simple Moving Average (SMA)
/// Returns a vector aligned with `values`:
/// - `None` until enough values exist
/// - `Some(avg)` after `window` values
///
/// Each mean is taken over its own window, so rounding error never carries
/// from one window into the next. A window of identical values averages to
/// exactly that value.
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 || values.len() < window {
        return vec![None; values.len()];
    }

    let means = values.windows(window).map(|w| {
        if w.iter().all(|&v| v == w[0]) {
            w[0]
        } else {
            compensated_sum(w) / window as f64
        }
    });

    std::iter::repeat(None)
        .take(window - 1)
        .chain(means.map(Some))
        .collect()
}

/// Neumaier summation: keeps the low-order bits a plain running sum drops.
fn compensated_sum(values: &[f64]) -> f64 {
    let (sum, compensation) = values.iter().fold((0.0_f64, 0.0_f64), |(sum, c), &v| {
        let t = sum + v;
        let c = if sum.abs() >= v.abs() {
            c + ((sum - t) + v)
        } else {
            c + ((v - t) + sum)
        };
        (t, c)
    });
    sum + compensation
}

/// Trailing SMA of closing prices, one entry per bar.
///
/// The first `window - 1` entries carry no average. Fails when the series
/// holds fewer than `window` bars.
pub fn compute_moving_average(
    series: &PriceSeries,
    window: usize,
) -> Result<Vec<MovingAveragePoint>, SignalError> {
    if window == 0 {
        return Err(SignalError::InvalidWindow(window));
    }
    if series.len() < window {
        return Err(SignalError::InsufficientData {
            required: window,
            available: series.len(),
        });
    }

    let averages = sma(&series.closes(), window);

    Ok(series
        .points()
        .iter()
        .zip(averages)
        .map(|(p, average)| MovingAveragePoint { date: p.date, average })
        .collect())
}
