mod analysis;
mod price_point;
mod signal;

pub use analysis::{
    AnalysisParams, AnalysisRequest, AnalysisResponse, Candle, ChartPayload, ChartSeries,
    ChartType, DateRange, LinePoint, SignalResponse, SummaryStats, VolumeBar, VolumeDirection,
    MAX_WINDOW, RECENT_ROWS,
};
pub use price_point::{PricePoint, PriceSeries, SeriesError};
pub use signal::{MovingAveragePoint, Signal, SignalSnapshot, TrendBias, TrendSummary};
