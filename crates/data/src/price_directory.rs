//! Offline price history read from a directory of per-ticker CSV files.
//!
//! Each file is named `<ticker>.csv` and needs a `date` column (`YYYY-MM-DD`)
//! plus `adjusted_close` or `close`. Adjusted closes win when both exist.

use async_trait::async_trait;
use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use satellite_core::{DailyPriceSeries, PriceHistoryProvider, PricePoint, ProviderError};
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

/// Reads `<dir>/<ticker>.csv` for every requested ticker.
#[derive(Debug, Clone)]
pub struct CsvPriceDirectory {
    dir: PathBuf,
}

impl CsvPriceDirectory {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the history file for `ticker`.
    ///
    /// # Errors
    /// Returns `Parse` for tickers that would escape the directory.
    pub fn file_for(&self, ticker: &str) -> Result<PathBuf, ProviderError> {
        if ticker.is_empty()
            || ticker.contains("..")
            || ticker.contains('/')
            || ticker.contains('\\')
        {
            return Err(ProviderError::Parse(format!("invalid ticker: {ticker:?}")));
        }
        Ok(self.dir.join(format!("{ticker}.csv")))
    }
}

#[async_trait]
impl PriceHistoryProvider for CsvPriceDirectory {
    async fn daily_history(&self, ticker: &str) -> Result<DailyPriceSeries, ProviderError> {
        let path = self.file_for(ticker)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProviderError::not_found(ticker));
            }
            Err(e) => return Err(e.into()),
        };

        debug!("Read {} bytes from {}", bytes.len(), path.display());
        parse_price_csv(bytes.as_slice())
    }

    fn name(&self) -> &str {
        "csv-directory"
    }
}

/// Parses a daily price CSV into a validated series.
///
/// # Errors
/// Returns `Parse` for missing columns or unreadable rows, and `Invalid` when
/// the rows do not form a valid series.
pub fn parse_price_csv<R: Read>(reader: R) -> Result<DailyPriceSeries, ProviderError> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ProviderError::Parse(e.to_string()))?
        .iter()
        .map(str::to_lowercase)
        .collect();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let date_col =
        column("date").ok_or_else(|| ProviderError::Parse("missing `date` column".to_string()))?;
    let close_col = column("adjusted_close")
        .or_else(|| column("close"))
        .ok_or_else(|| ProviderError::Parse("missing `close` column".to_string()))?;

    let mut points = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ProviderError::Parse(e.to_string()))?;
        let raw_date = record.get(date_col).unwrap_or("");
        let raw_close = record.get(close_col).unwrap_or("");

        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
            .map_err(|e| ProviderError::Parse(format!("bad date {raw_date:?}: {e}")))?;
        let close: f64 = raw_close
            .parse()
            .map_err(|e| ProviderError::Parse(format!("bad close {raw_close:?} on {date}: {e}")))?;

        points.push(PricePoint::new(date, close));
    }

    Ok(DailyPriceSeries::from_unsorted(points)?)
}
