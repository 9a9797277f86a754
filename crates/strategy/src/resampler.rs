//! Daily to monthly resampling with month-completeness correction.

use chrono::{Datelike, NaiveDate};
use satellite_core::{DailyPriceSeries, ExclusionReason, MonthlyPriceSeries, StrategyConfig};
use tracing::debug;

/// Number of days in the month containing `date`.
#[must_use]
pub fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map_or(31, |last| last.day())
}

/// Whether the month containing `as_of` should still be treated as partial.
///
/// The month counts as complete once `as_of` reaches `days_in_month - margin_days`.
#[must_use]
pub fn is_month_incomplete(as_of: NaiveDate, margin_days: u32) -> bool {
    as_of.day() < days_in_month(as_of).saturating_sub(margin_days)
}

/// Resamples a daily series to month-end points.
///
/// 1. Requires at least `trend_window` daily observations.
/// 2. Keeps the last observation of each calendar month.
/// 3. Drops the entry for `as_of`'s month while that month is incomplete, unless
///    fewer than two entries would remain.
/// 4. Requires `min_monthly_points` entries afterwards.
///
/// # Errors
/// `InsufficientHistory` or `InsufficientMonthlyHistory`.
pub fn resample_monthly(
    daily: &DailyPriceSeries,
    as_of: NaiveDate,
    config: &StrategyConfig,
) -> Result<MonthlyPriceSeries, ExclusionReason> {
    if daily.len() < config.trend_window {
        return Err(ExclusionReason::InsufficientHistory {
            observations: daily.len(),
            required: config.trend_window,
        });
    }

    let mut monthly = daily.month_ends();

    let in_current_month = monthly
        .last()
        .is_some_and(|p| p.date.year() == as_of.year() && p.date.month() == as_of.month());

    if in_current_month && is_month_incomplete(as_of, config.completeness_margin_days) {
        if monthly.len() > 2 {
            if let Some(dropped) = monthly.drop_last() {
                debug!(
                    "Dropped incomplete month {} (as of {})",
                    dropped.date.format("%Y-%m"),
                    as_of
                );
            }
        } else {
            debug!("Kept incomplete month: too few monthly points to drop it");
        }
    }

    if monthly.len() < config.min_monthly_points {
        return Err(ExclusionReason::InsufficientMonthlyHistory {
            months: monthly.len(),
            required: config.min_monthly_points,
        });
    }

    Ok(monthly)
}

#[cfg(test)]
mod tests {
    use super::*;
    use satellite_core::PricePoint;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// One observation per calendar day from `start` for `days` days.
    fn calendar_series(start: NaiveDate, days: usize) -> DailyPriceSeries {
        let points = start
            .iter_days()
            .take(days)
            .enumerate()
            .map(|(i, d)| PricePoint::new(d, 100.0 + i as f64))
            .collect();
        DailyPriceSeries::new(points).unwrap()
    }

    fn relaxed_config() -> StrategyConfig {
        StrategyConfig {
            trend_window: 1,
            min_monthly_points: 1,
            ..StrategyConfig::default()
        }
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(date(2024, 2, 10)), 29);
        assert_eq!(days_in_month(date(2025, 2, 10)), 28);
        assert_eq!(days_in_month(date(2025, 12, 31)), 31);
        assert_eq!(days_in_month(date(2025, 4, 1)), 30);
    }

    #[test]
    fn test_month_incomplete_cutoff() {
        // 31-day month: complete from day 29 on
        assert!(is_month_incomplete(date(2025, 10, 28), 2));
        assert!(!is_month_incomplete(date(2025, 10, 29), 2));
        // 30-day month: complete from day 28 on
        assert!(is_month_incomplete(date(2025, 9, 27), 2));
        assert!(!is_month_incomplete(date(2025, 9, 28), 2));
    }

    #[test]
    fn test_rejects_short_daily_history() {
        let daily = calendar_series(date(2025, 1, 1), 199);
        let err = resample_monthly(&daily, date(2026, 1, 31), &StrategyConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            ExclusionReason::InsufficientHistory {
                observations: 199,
                required: 200
            }
        );
    }

    #[test]
    fn test_one_entry_per_month_dated_at_last_observation() {
        // 2025-01-01 .. 2025-06-30, one point per day
        let daily = calendar_series(date(2025, 1, 1), 181);
        let monthly = resample_monthly(&daily, date(2025, 12, 15), &relaxed_config()).unwrap();

        assert_eq!(monthly.len(), 6);
        let dates: Vec<NaiveDate> = monthly.points().iter().map(|p| p.date).collect();
        assert_eq!(
            dates,
            vec![
                date(2025, 1, 31),
                date(2025, 2, 28),
                date(2025, 3, 31),
                date(2025, 4, 30),
                date(2025, 5, 31),
                date(2025, 6, 30),
            ]
        );
    }

    #[test]
    fn test_drops_incomplete_current_month() {
        // through 2025-06-10
        let daily = calendar_series(date(2025, 1, 1), 161);
        let monthly = resample_monthly(&daily, date(2025, 6, 10), &relaxed_config()).unwrap();
        assert_eq!(monthly.len(), 5);
        assert_eq!(monthly.last().unwrap().date, date(2025, 5, 31));
    }

    #[test]
    fn test_keeps_current_month_near_month_end() {
        let daily = calendar_series(date(2025, 1, 1), 178);
        // 2025-06-27 is day 27 of 30: 27 < 28, still incomplete
        let monthly = resample_monthly(&daily, date(2025, 6, 27), &relaxed_config()).unwrap();
        assert_eq!(monthly.len(), 5);

        let daily = calendar_series(date(2025, 1, 1), 179);
        // 2025-06-28 reaches the cutoff
        let monthly = resample_monthly(&daily, date(2025, 6, 28), &relaxed_config()).unwrap();
        assert_eq!(monthly.len(), 6);
        assert_eq!(monthly.last().unwrap().date, date(2025, 6, 28));
    }

    #[test]
    fn test_keeps_current_month_from_previous_year() {
        // last point 2024-06-10 while as_of is 2025-06-10: different month
        let daily = calendar_series(date(2024, 1, 1), 162);
        let monthly = resample_monthly(&daily, date(2025, 6, 10), &relaxed_config()).unwrap();
        assert_eq!(monthly.len(), 6);
    }

    #[test]
    fn test_correction_skipped_when_too_few_points_remain() {
        // two months: dropping one would leave a single entry
        let daily = calendar_series(date(2025, 5, 1), 41);
        let monthly = resample_monthly(&daily, date(2025, 6, 10), &relaxed_config()).unwrap();
        assert_eq!(monthly.len(), 2);

        let daily = calendar_series(date(2025, 6, 1), 10);
        let monthly = resample_monthly(&daily, date(2025, 6, 10), &relaxed_config()).unwrap();
        assert_eq!(monthly.len(), 1);
    }

    #[test]
    fn test_rejects_short_monthly_history() {
        // 300 days starting 2025-01-01 ends 2025-10-27: 10 months, 9 after correction
        let daily = calendar_series(date(2025, 1, 1), 300);
        let err = resample_monthly(&daily, date(2025, 10, 27), &StrategyConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            ExclusionReason::InsufficientMonthlyHistory {
                months: 9,
                required: 11
            }
        );
    }
}
