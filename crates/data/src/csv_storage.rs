use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim, WriterBuilder};
use satellite_core::{InstrumentRef, RankedInstrument};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Header of the exported signal report.
pub const SIGNAL_COLUMNS: [&str; 19] = [
    "Rank",
    "Ticker",
    "Name",
    "ISIN",
    "constraint_group",
    "Close",
    "RefDate",
    "Score",
    "Is_Uptrend",
    "SMA200",
    "P1M",
    "P3M",
    "P6M",
    "P10M",
    "R1M",
    "R3M",
    "R6M",
    "R10M",
    "Approx10M",
];

pub struct CsvStorage;

impl CsvStorage {
    /// Reads the investable universe.
    ///
    /// Headers are matched case-insensitively after trimming. `ticker` is
    /// required; `name`, `isin` and `constraint_group` are optional. Rows with
    /// a blank ticker are skipped and repeated tickers keep their first row.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or has no `ticker` column.
    pub fn read_universe(path: impl AsRef<Path>) -> Result<Vec<InstrumentRef>> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open universe file: {}", path.display()))?;
        let universe = Self::parse_universe(file)
            .with_context(|| format!("Failed to parse universe file: {}", path.display()))?;

        info!("Loaded {} instruments from {}", universe.len(), path.display());
        Ok(universe)
    }

    /// Parses universe rows from any reader. See [`CsvStorage::read_universe`].
    ///
    /// # Errors
    /// Returns error on malformed CSV or a missing `ticker` column.
    pub fn parse_universe<R: Read>(reader: R) -> Result<Vec<InstrumentRef>> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();
        let column = |name: &str| headers.iter().position(|h| h == name);

        let Some(ticker_col) = column("ticker") else {
            bail!("missing required column `ticker` (found: {})", headers.join(", "));
        };
        let name_col = column("name");
        let isin_col = column("isin");
        let group_col = column("constraint_group");

        let mut seen = HashSet::new();
        let mut universe = Vec::new();

        for (line, record) in reader.records().enumerate() {
            let record = record?;
            let field = |col: Option<usize>| col.and_then(|c| record.get(c)).unwrap_or("");

            let ticker = field(Some(ticker_col));
            if ticker.is_empty() {
                warn!("Skipping universe row {}: blank ticker", line + 2);
                continue;
            }
            if !seen.insert(ticker.to_string()) {
                warn!("Duplicate ticker {} in universe, keeping the first row", ticker);
                continue;
            }

            universe.push(
                InstrumentRef::new(ticker)
                    .with_name(field(name_col))
                    .with_isin(field(isin_col))
                    .with_group(field(group_col)),
            );
        }

        Ok(universe)
    }

    /// File name of the signal report for a run date.
    #[must_use]
    pub fn signal_file_name(as_of: NaiveDate) -> String {
        format!("satellite_signals_{}.csv", as_of.format("%Y-%m-%d"))
    }

    /// Writes the full ranking as a semicolon-separated report with decimal
    /// commas, best score first.
    ///
    /// # Errors
    /// Returns error if the file cannot be created or writing fails
    pub fn write_signals(
        dir: impl AsRef<Path>,
        as_of: NaiveDate,
        ranking: &[RankedInstrument],
    ) -> Result<PathBuf> {
        let path = dir.as_ref().join(Self::signal_file_name(as_of));
        let file = File::create(&path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        let mut writer = WriterBuilder::new().delimiter(b';').from_writer(file);

        writer.write_record(SIGNAL_COLUMNS)?;

        for entry in ranking {
            let m = &entry.metrics;
            let lookback = &m.lookback_prices;
            let returns = &m.returns;
            writer.write_record([
                (entry.rank + 1).to_string(),
                entry.instrument.ticker.clone(),
                entry.instrument.name.clone(),
                entry.instrument.isin_or_empty().to_string(),
                entry.instrument.group().unwrap_or("").to_string(),
                decimal_comma(m.reference_price),
                m.reference_date.format("%Y-%m-%d").to_string(),
                decimal_comma(m.score),
                m.is_uptrend.to_string(),
                m.trend_baseline.map(decimal_comma).unwrap_or_default(),
                decimal_comma(lookback.one_month),
                decimal_comma(lookback.three_months),
                decimal_comma(lookback.six_months),
                decimal_comma(lookback.ten_months),
                decimal_comma(returns.one_month),
                decimal_comma(returns.three_months),
                decimal_comma(returns.six_months),
                decimal_comma(returns.ten_months),
                m.ten_month_approximated.to_string(),
            ])?;
        }

        writer.flush()?;
        info!("Exported {} ranked instruments to {}", ranking.len(), path.display());
        Ok(path)
    }
}

/// Renders a float with a comma as decimal separator.
#[must_use]
pub fn decimal_comma(value: f64) -> String {
    value.to_string().replace('.', ",")
}
