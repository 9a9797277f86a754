//! Input and output around the satellite strategy engine.
//!
//! This crate provides:
//! - Universe CSV loading and the semicolon/decimal-comma signal export
//! - An offline price history provider backed by per-ticker CSV files
//! - A rate-limited EODHD HTTP provider

pub mod csv_storage;
pub mod eodhd;
pub mod history;
pub mod price_directory;

pub use csv_storage::{decimal_comma, CsvStorage, SIGNAL_COLUMNS};
pub use eodhd::{EodhdClient, DEMO_API_KEY};
pub use history::fetch_histories;
pub use price_directory::{parse_price_csv, CsvPriceDirectory};
