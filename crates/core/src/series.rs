//! Daily and monthly closing-price series.

use crate::error::ExclusionReason;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single dated closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    #[must_use]
    pub const fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Daily closes for one instrument, strictly increasing by date.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyPriceSeries {
    points: Vec<PricePoint>,
}

impl DailyPriceSeries {
    /// Validates and wraps daily points.
    ///
    /// # Errors
    /// Returns `ProviderDataMalformed` if the series is empty, dates are not
    /// strictly increasing, or a close is not a finite positive number.
    pub fn new(points: Vec<PricePoint>) -> Result<Self, ExclusionReason> {
        if points.is_empty() {
            return Err(ExclusionReason::malformed("empty price history"));
        }

        if let Some(bad) = points
            .iter()
            .find(|p| !p.close.is_finite() || p.close <= 0.0)
        {
            return Err(ExclusionReason::malformed(format!(
                "invalid close {} on {}",
                bad.close, bad.date
            )));
        }

        if let Some(pair) = points.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(ExclusionReason::malformed(format!(
                "dates not strictly increasing at {} -> {}",
                pair[0].date, pair[1].date
            )));
        }

        Ok(Self { points })
    }

    /// Sorts by date and drops repeated dates (keeping the last) before
    /// validating. Used for provider payloads that arrive unordered.
    ///
    /// # Errors
    /// See [`DailyPriceSeries::new`].
    pub fn from_unsorted(mut points: Vec<PricePoint>) -> Result<Self, ExclusionReason> {
        points.sort_by_key(|p| p.date);
        // dedup_by keeps the first of a run; reverse so the later row wins
        points.reverse();
        points.dedup_by_key(|p| p.date);
        points.reverse();
        Self::new(points)
    }

    #[must_use]
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    #[must_use]
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// All points dated on or before `date`.
    #[must_use]
    pub fn up_to(&self, date: NaiveDate) -> &[PricePoint] {
        let end = self.points.partition_point(|p| p.date <= date);
        &self.points[..end]
    }
}

/// One entry per calendar month: the last daily observation of that month,
/// dated at the observation's actual date.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyPriceSeries {
    points: Vec<PricePoint>,
}

impl MonthlyPriceSeries {
    pub(crate) const fn from_points(points: Vec<PricePoint>) -> Self {
        Self { points }
    }

    #[must_use]
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Entry `offset` positions before the last one (`0` is the last entry).
    #[must_use]
    pub fn back(&self, offset: usize) -> Option<&PricePoint> {
        self.points
            .len()
            .checked_sub(offset + 1)
            .and_then(|idx| self.points.get(idx))
    }

    /// Removes the last entry.
    pub fn drop_last(&mut self) -> Option<PricePoint> {
        self.points.pop()
    }
}

impl DailyPriceSeries {
    /// Groups by calendar month and keeps each month's last observation.
    #[must_use]
    pub fn month_ends(&self) -> MonthlyPriceSeries {
        use chrono::Datelike;

        let mut monthly: Vec<PricePoint> = Vec::new();
        for point in &self.points {
            match monthly.last_mut() {
                Some(last)
                    if last.date.year() == point.date.year()
                        && last.date.month() == point.date.month() =>
                {
                    *last = *point;
                }
                _ => monthly.push(*point),
            }
        }
        MonthlyPriceSeries::from_points(monthly)
    }
}
