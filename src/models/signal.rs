use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Recommendation derived from the latest close versus the moving average
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Latest close above the average
    #[serde(rename = "BUY")]
    Buy,

    /// Latest close below the average
    #[serde(rename = "SELL")]
    Sell,

    /// Latest close exactly on the average
    #[serde(rename = "HOLD")]
    Hold,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

/// Moving average value for one date; `None` while the window is still filling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingAveragePoint {
    pub date: NaiveDate,
    pub average: Option<f64>,
}

/// Latest close, latest average and the signal they produce
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalSnapshot {
    pub date: NaiveDate,
    pub latest_close: f64,
    pub latest_average: f64,
    pub window: usize,
    pub signal: Signal,
}

impl SignalSnapshot {
    pub fn message(&self) -> String {
        let relation = match self.signal {
            Signal::Buy => "above",
            Signal::Sell => "below",
            Signal::Hold => "at",
        };
        format!(
            "{} Signal: Price (${:.2}) is {} {}-day MA (${:.2})",
            self.signal, self.latest_close, relation, self.window, self.latest_average
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TrendBias {
    #[serde(rename = "above")]
    Above,

    #[serde(rename = "below")]
    Below,
}

/// How the closes sat relative to the average over the most recent window
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendSummary {
    pub days_considered: usize,
    pub days_below_average: usize,
    pub bias: TrendBias,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&Signal::Buy).unwrap(), "\"BUY\"");
        assert_eq!(serde_json::to_string(&Signal::Hold).unwrap(), "\"HOLD\"");
    }

    #[test]
    fn test_snapshot_message() {
        let snapshot = SignalSnapshot {
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            latest_close: 15.0,
            latest_average: 13.0,
            window: 3,
            signal: Signal::Buy,
        };

        assert_eq!(
            snapshot.message(),
            "BUY Signal: Price ($15.00) is above 3-day MA ($13.00)"
        );
    }
}
