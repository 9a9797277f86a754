//! Multi-horizon momentum score and trend filter for a single instrument.
//!
//! The reference point `P0` is the last entry of the corrected monthly series.
//! Lookback prices sit 1, 3, 6 and 10 monthly entries before it. The trend
//! baseline is a simple moving average over the daily closes up to and including
//! `P0`'s date, so later data never leaks into the verdict.

use crate::resampler::resample_monthly;
use chrono::NaiveDate;
use satellite_core::{
    DailyPriceSeries, ExclusionReason, Horizon, HorizonValues, MomentumMetrics,
    MonthlyPriceSeries, PricePoint, StrategyConfig, WeightProfile,
};
use tracing::warn;

/// Weighted average of the horizon returns, normalized by the weight total.
#[must_use]
pub fn composite_score(returns: &HorizonValues, weights: &WeightProfile) -> f64 {
    let weighted = weights.one_month * returns.one_month
        + weights.three_months * returns.three_months
        + weights.six_months * returns.six_months
        + weights.ten_months * returns.ten_months;
    weighted / weights.total()
}

/// Mean close of the last `window` points, `None` if fewer are available.
#[must_use]
pub fn simple_moving_average(points: &[PricePoint], window: usize) -> Option<f64> {
    if window == 0 || points.len() < window {
        return None;
    }
    let tail = &points[points.len() - window..];
    let sum: f64 = tail.iter().map(|p| p.close).sum();
    Some(sum / window as f64)
}

/// Resolved lookback price with its origin.
struct Lookback {
    price: f64,
    approximated: bool,
}

fn resolve_lookback(
    horizon: Horizon,
    monthly: &MonthlyPriceSeries,
    daily: &DailyPriceSeries,
    config: &StrategyConfig,
) -> Result<Lookback, ExclusionReason> {
    if let Some(point) = monthly.back(horizon.months_back()) {
        return Ok(Lookback {
            price: point.close,
            approximated: false,
        });
    }

    if horizon == Horizon::TenMonths && config.ten_month_fallback {
        if let Some(oldest) = daily.first() {
            return Ok(Lookback {
                price: oldest.close,
                approximated: true,
            });
        }
    }

    Err(ExclusionReason::InsufficientLookback { horizon })
}

/// Computes the momentum metrics of one instrument as of `as_of`.
///
/// # Errors
/// Returns the exclusion reason when the history cannot support a score.
pub fn compute_metrics(
    ticker: &str,
    daily: &DailyPriceSeries,
    as_of: NaiveDate,
    config: &StrategyConfig,
) -> Result<MomentumMetrics, ExclusionReason> {
    let monthly = resample_monthly(daily, as_of, config)?;

    let reference = *monthly
        .last()
        .ok_or_else(|| ExclusionReason::malformed("no monthly reference point"))?;

    let mut prices = [0.0_f64; 4];
    let mut ten_month_approximated = false;
    for (slot, horizon) in prices.iter_mut().zip(Horizon::ALL) {
        let lookback = resolve_lookback(horizon, &monthly, daily, config)?;
        if lookback.approximated {
            ten_month_approximated = true;
            warn!(
                "{ticker}: 10M lookback approximated with oldest daily price from {} ({} monthly points)",
                daily.first().map_or_else(String::new, |p| p.date.to_string()),
                monthly.len()
            );
        }
        *slot = lookback.price;
    }

    let lookback_prices = HorizonValues {
        one_month: prices[0],
        three_months: prices[1],
        six_months: prices[2],
        ten_months: prices[3],
    };
    let returns = HorizonValues::from_fn(|h| reference.close / lookback_prices.get(h) - 1.0);
    let score = composite_score(&returns, &config.weights);

    let trend_baseline =
        simple_moving_average(daily.up_to(reference.date), config.trend_window);
    if trend_baseline.is_none() {
        warn!(
            "{ticker}: fewer than {} daily closes up to {}, trend filter fails",
            config.trend_window, reference.date
        );
    }

    let above_trend = trend_baseline.is_some_and(|baseline| reference.close > baseline);
    let is_uptrend = above_trend && score > 0.0;

    Ok(MomentumMetrics {
        reference_price: reference.close,
        reference_date: reference.date,
        trend_baseline,
        score,
        lookback_prices,
        returns,
        is_uptrend,
        ten_month_approximated,
    })
}
