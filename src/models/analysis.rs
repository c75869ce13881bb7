use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{PricePoint, SignalSnapshot, TrendSummary};

pub const DEFAULT_LOOKBACK_DAYS: i64 = 365;
pub const MAX_WINDOW: usize = 200;
pub const RECENT_ROWS: usize = 5;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChartType {
    #[default]
    #[serde(rename = "line")]
    Line,

    #[serde(rename = "candlestick", alias = "candle")]
    Candlestick,
}

/// Query string shared by the price and analysis endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisParams {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub window: Option<usize>,
    pub chart_type: Option<ChartType>,
}

/// Half-open date range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Fills in missing bounds: `end` defaults to `today`, `start` to a year before `end`.
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Self, String> {
        let end = end.unwrap_or(today);
        let start = match start {
            Some(start) => start,
            None => end
                .checked_sub_signed(Duration::days(DEFAULT_LOOKBACK_DAYS))
                .ok_or_else(|| format!("Invalid date range: end {} is out of range", end))?,
        };

        if start >= end {
            return Err(format!("Invalid date range: start {} must be before end {}", start, end));
        }

        Ok(Self { start, end })
    }
}

/// Fully resolved analysis request
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub ticker: String,
    pub range: DateRange,
    pub window: usize,
    pub chart_type: ChartType,
}

/// The numbers shown next to the chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub current_price: f64,
    pub daily_change_pct: Option<f64>,
    pub volume: u64,
    pub year_high: f64,
    pub year_low: f64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum VolumeDirection {
    #[serde(rename = "up")]
    Up,
    #[serde(rename = "down")]
    Down,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeBar {
    pub date: NaiveDate,
    pub volume: u64,
    pub direction: VolumeDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePoint {
    pub date: NaiveDate,
    pub close: f64,
    pub average: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub average: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "chart_type", content = "points")]
pub enum ChartSeries {
    #[serde(rename = "line")]
    Line(Vec<LinePoint>),
    #[serde(rename = "candlestick")]
    Candlestick(Vec<Candle>),
}

/// Everything a front end needs to draw the price chart with its MA overlay and volume panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPayload {
    pub title: String,
    pub moving_average_label: String,
    pub series: ChartSeries,
    pub volume: Vec<VolumeBar>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub ticker: String,
    pub range: DateRange,
    pub window: usize,
    pub signal: SignalSnapshot,
    pub message: String,
    pub trend: TrendSummary,
    pub summary: SummaryStats,
    pub recent: Vec<PricePoint>,
    pub chart: ChartPayload,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignalResponse {
    pub ticker: String,
    #[serde(flatten)]
    pub snapshot: SignalSnapshot,
    pub message: String,
}
