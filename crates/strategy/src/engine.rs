//! Universe evaluation and the end-to-end strategy run.

use crate::allocation::allocate;
use crate::momentum::compute_metrics;
use crate::ranker::Ranking;
use crate::turnover::compute_turnover;
use chrono::NaiveDate;
use satellite_core::{
    Allocation, ConfigError, DailyPriceSeries, Exclusion, ExclusionReason, InstrumentRef,
    MomentumMetrics, StrategyConfig, TurnoverReport,
};
use tracing::{info, warn};

/// Price history handed to the engine for one universe entry.
pub type HistoryInput = (InstrumentRef, Result<DailyPriceSeries, ExclusionReason>);

/// Ranking of every scored instrument plus the audit trail of exclusions.
#[derive(Debug, Clone)]
pub struct UniverseEvaluation {
    pub ranking: Ranking,
    pub exclusions: Vec<Exclusion>,
}

/// Everything one strategy run produces.
#[derive(Debug, Clone)]
pub struct SatelliteRun {
    pub as_of: NaiveDate,
    pub evaluation: UniverseEvaluation,
    pub allocation: Allocation,
    pub turnover: TurnoverReport,
}

/// Momentum scoring and allocation for one strategy profile.
#[derive(Debug, Clone)]
pub struct MomentumEngine {
    config: StrategyConfig,
}

impl MomentumEngine {
    /// Creates an engine after validating the profile.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: StrategyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Scores one instrument.
    ///
    /// # Errors
    /// Returns why the instrument cannot be scored.
    pub fn evaluate(
        &self,
        ticker: &str,
        daily: &DailyPriceSeries,
        as_of: NaiveDate,
    ) -> Result<MomentumMetrics, ExclusionReason> {
        compute_metrics(ticker, daily, as_of, &self.config)
    }

    /// Scores every instrument and ranks the ones that produced metrics.
    ///
    /// One instrument's failure never affects another; failures are recorded as
    /// exclusions in universe order.
    pub fn evaluate_universe(
        &self,
        inputs: Vec<HistoryInput>,
        as_of: NaiveDate,
    ) -> UniverseEvaluation {
        let total = inputs.len();
        let mut scored = Vec::with_capacity(total);
        let mut exclusions = Vec::new();

        for (instrument, history) in inputs {
            let result = history.and_then(|daily| self.evaluate(&instrument.ticker, &daily, as_of));
            match result {
                Ok(metrics) => scored.push((instrument, metrics)),
                Err(reason) => {
                    warn!("Excluded {}: {}", instrument.ticker, reason);
                    exclusions.push(Exclusion {
                        ticker: instrument.ticker,
                        reason,
                    });
                }
            }
        }

        info!(
            "Scored {} of {} instruments ({} excluded)",
            scored.len(),
            total,
            exclusions.len()
        );

        UniverseEvaluation {
            ranking: Ranking::new(scored, self.config.stability_buffer),
            exclusions,
        }
    }

    /// Runs the full pipeline: score, rank, allocate, and diff against holdings.
    pub fn run<S: AsRef<str>>(
        &self,
        inputs: Vec<HistoryInput>,
        holdings: &[S],
        as_of: NaiveDate,
    ) -> SatelliteRun {
        let evaluation = self.evaluate_universe(inputs, as_of);
        let allocation = allocate(&evaluation.ranking, holdings, &self.config);
        let turnover = compute_turnover(holdings, &allocation, &self.config);

        info!(
            "Allocation: {} invested, {} cash, {} trade(s)",
            allocation.invested_count(),
            allocation.cash_count(),
            turnover.trade_count
        );

        SatelliteRun {
            as_of,
            evaluation,
            allocation,
            turnover,
        }
    }
}

/// Validates `config` and runs the full pipeline once.
///
/// # Errors
/// Returns an error if the configuration is invalid.
pub fn run_strategy<S: AsRef<str>>(
    config: StrategyConfig,
    inputs: Vec<HistoryInput>,
    holdings: &[S],
    as_of: NaiveDate,
) -> Result<SatelliteRun, ConfigError> {
    Ok(MomentumEngine::new(config)?.run(inputs, holdings, as_of))
}
