//! The `run` command: fetch prices, score, allocate, report and export.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use satellite_core::{
    AppConfig, ConfigLoader, PriceHistoryProvider, ReportFormatter, StrategyPreset,
    DEFAULT_CONFIG_PATH,
};
use satellite_data::{fetch_histories, CsvPriceDirectory, CsvStorage, EodhdClient};
use satellite_strategy::{MomentumEngine, SatelliteRun};
use std::path::PathBuf;
use tracing::info;

/// Arguments for the run command.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Universe CSV with a `ticker` column and optional name, isin, constraint_group
    #[arg(short, long, default_value = "ticker.csv")]
    pub universe: String,

    /// Comma-separated list of currently held tickers (e.g., SWDA.LSE,GLD.US)
    #[arg(long)]
    pub current: Option<String>,

    /// Named strategy preset (standard, short-window); overrides the config file
    #[arg(long)]
    pub preset: Option<StrategyPreset>,

    /// Read `<ticker>.csv` price files from this directory instead of EODHD
    #[arg(long)]
    pub prices_dir: Option<PathBuf>,

    /// EODHD API token (falls back to the config file, then "demo")
    #[arg(long, env = "EODHD_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Run date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Directory for the signal CSV (overrides the config file)
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// Skip writing the signal CSV
    #[arg(long)]
    pub no_export: bool,

    /// Config file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<String>,
}

impl RunArgs {
    /// Held tickers, trimmed, blanks dropped.
    #[must_use]
    pub fn holdings(&self) -> Vec<String> {
        self.current
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn load_config(&self) -> Result<AppConfig> {
        let mut config = match self.preset {
            Some(preset) => ConfigLoader::load_with_preset(&self.config, preset)?,
            None => ConfigLoader::load(&self.config)?,
        };
        if let Some(key) = &self.api_key {
            config.provider.api_key = Some(key.clone());
        }
        if let Some(dir) = &self.export_dir {
            config.output.export_dir = dir.display().to_string();
        }
        Ok(config)
    }
}

/// Runs the run command.
///
/// # Errors
/// Returns an error if the configuration or universe cannot be loaded, or the
/// export cannot be written. Per-instrument data failures are reported, not raised.
pub async fn run_satellite(args: RunArgs) -> Result<()> {
    let config = args.load_config()?;
    let as_of = args
        .as_of
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let holdings = args.holdings();

    println!("\n{}", "=".repeat(60));
    println!(" SATELLITE STRATEGY ALGORITHM");
    println!(" Strategy: GTAA Agg 3 Dual Momentum");
    println!("{}\n", "=".repeat(60));

    let universe = CsvStorage::read_universe(&args.universe)?;
    println!("Initiating analysis for {} assets...\n", universe.len());

    let provider: Box<dyn PriceHistoryProvider> = match &args.prices_dir {
        Some(dir) => Box::new(CsvPriceDirectory::new(dir.clone())),
        None => Box::new(
            EodhdClient::new(config.provider.clone(), as_of)
                .context("Failed to create EODHD client")?,
        ),
    };

    let inputs = fetch_histories(provider.as_ref(), universe).await;
    let engine = MomentumEngine::new(config.strategy.clone())?;
    let run = engine.run(inputs, holdings.as_slice(), as_of);

    print!("{}", render_report(&run, !holdings.is_empty()));

    if args.no_export {
        info!("Signal export skipped");
    } else {
        let path = CsvStorage::write_signals(
            &config.output.export_dir,
            as_of,
            run.evaluation.ranking.entries(),
        )?;
        println!("\n[SYSTEM] Detailed analytical report exported to: {}", path.display());
    }

    Ok(())
}

/// Console report; the turnover block only appears when holdings were given.
pub fn render_report(run: &SatelliteRun, has_holdings: bool) -> String {
    ReportFormatter::format(
        run.evaluation.ranking.stability_buffer(),
        &run.allocation,
        &run.evaluation.exclusions,
        has_holdings.then_some(&run.turnover),
    )
}
