use crate::external::price_provider::{ExternalPricePoint, PriceProvider, PriceProviderError};
use async_trait::async_trait;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::io::Read;
use std::path::PathBuf;

/// Serves history from `<dir>/<TICKER>.csv` files exported in the usual
/// `Date,Open,High,Low,Close,Volume` layout.
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", ticker))
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Open")]
    open: Option<f64>,
    #[serde(rename = "High")]
    high: Option<f64>,
    #[serde(rename = "Low")]
    low: Option<f64>,
    #[serde(rename = "Close")]
    close: Option<f64>,
    #[serde(rename = "Volume")]
    volume: Option<f64>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, PriceProviderError> {
    // Exports sometimes carry a time part: "2024-01-02 00:00:00-05:00"
    let day = raw.trim().get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| PriceProviderError::Parse(format!("bad date '{}': {}", raw, e)))
}

pub(crate) fn read_rows<R: Read>(
    reader: R,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
    let mut rdr = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut points = Vec::new();

    for row in rdr.deserialize::<CsvRow>() {
        let row = row.map_err(|e| PriceProviderError::Parse(e.to_string()))?;
        let date = parse_date(&row.date)?;
        if date < start || date >= end {
            continue;
        }

        let (Some(open), Some(high), Some(low), Some(close)) = (row.open, row.high, row.low, row.close) else {
            continue;
        };

        points.push(ExternalPricePoint {
            date,
            open,
            high,
            low,
            close,
            volume: row.volume.unwrap_or(0.0).max(0.0) as u64,
        });
    }

    points.sort_by_key(|p| p.date);
    Ok(points)
}

#[async_trait]
impl PriceProvider for CsvProvider {
    async fn fetch_daily_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
        let path = self.path_for(ticker);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PriceProviderError::NotFound);
            }
            Err(e) => {
                return Err(PriceProviderError::BadResponse(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        read_rows(bytes.as_slice(), start, end)
    }

    fn name(&self) -> &'static str {
        "csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    const SAMPLE: &str = "Date,Open,High,Low,Close,Volume\n\
        2024-01-02,10,11,9,10.5,1000\n\
        2024-01-03 00:00:00-05:00,10.5,12,10,11.5,\n\
        2024-01-04,,12,10,11,500\n\
        2024-01-05,11,13,10.5,12.5,2000\n";

    #[test]
    fn test_read_rows_filters_range_and_incomplete_rows() {
        let points = read_rows(SAMPLE.as_bytes(), d(2024, 1, 1), d(2024, 1, 5)).unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, d(2024, 1, 2));
        assert_eq!(points[1].date, d(2024, 1, 3));
        assert_eq!(points[1].volume, 0);
    }

    #[test]
    fn test_read_rows_rejects_bad_dates() {
        let data = "Date,Open,High,Low,Close,Volume\nnot-a-date,1,1,1,1,1\n";
        let result = read_rows(data.as_bytes(), d(2024, 1, 1), d(2024, 2, 1));

        assert!(matches!(result, Err(PriceProviderError::Parse(_))));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let provider = CsvProvider::new(std::env::temp_dir().join("stockdash-no-such-dir"));
        let result = provider
            .fetch_daily_history("NOPE", d(2024, 1, 1), d(2024, 2, 1))
            .await;

        assert!(matches!(result, Err(PriceProviderError::NotFound)));
    }
}
