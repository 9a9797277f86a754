use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lookback horizons of the composite momentum score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Horizon {
    OneMonth,
    ThreeMonths,
    SixMonths,
    TenMonths,
}

impl Horizon {
    pub const ALL: [Self; 4] = [
        Self::OneMonth,
        Self::ThreeMonths,
        Self::SixMonths,
        Self::TenMonths,
    ];

    /// Calendar months between the reference point and the lookback point.
    #[must_use]
    pub const fn months_back(self) -> usize {
        match self {
            Self::OneMonth => 1,
            Self::ThreeMonths => 3,
            Self::SixMonths => 6,
            Self::TenMonths => 10,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::OneMonth => "1M",
            Self::ThreeMonths => "3M",
            Self::SixMonths => "6M",
            Self::TenMonths => "10M",
        }
    }
}

impl std::fmt::Display for Horizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One value per horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizonValues {
    pub one_month: f64,
    pub three_months: f64,
    pub six_months: f64,
    pub ten_months: f64,
}

impl HorizonValues {
    #[must_use]
    pub const fn get(&self, horizon: Horizon) -> f64 {
        match horizon {
            Horizon::OneMonth => self.one_month,
            Horizon::ThreeMonths => self.three_months,
            Horizon::SixMonths => self.six_months,
            Horizon::TenMonths => self.ten_months,
        }
    }

    /// Builds the values by evaluating `f` for every horizon.
    pub fn from_fn(mut f: impl FnMut(Horizon) -> f64) -> Self {
        Self {
            one_month: f(Horizon::OneMonth),
            three_months: f(Horizon::ThreeMonths),
            six_months: f(Horizon::SixMonths),
            ten_months: f(Horizon::TenMonths),
        }
    }
}

/// Momentum result for one instrument.
///
/// Only ever constructed complete: an instrument with insufficient data has no
/// metrics at all, it is excluded instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentumMetrics {
    /// Price of the reference point (last entry of the corrected monthly series).
    pub reference_price: f64,
    /// Actual trading date of the reference point.
    pub reference_date: NaiveDate,
    /// Trailing simple moving average ending at the reference date. `None` when
    /// fewer daily observations than the window precede the reference date.
    pub trend_baseline: Option<f64>,
    /// Weighted composite of the horizon returns.
    pub score: f64,
    /// Lookback prices the returns were computed from.
    pub lookback_prices: HorizonValues,
    /// `(P0 / P-h) - 1` for each horizon.
    pub returns: HorizonValues,
    /// Price above trend baseline and positive score.
    pub is_uptrend: bool,
    /// The 10M lookback used the oldest daily price instead of a monthly point.
    pub ten_month_approximated: bool,
}

impl MomentumMetrics {
    /// Returns whether the reference price sits above the trend baseline.
    #[must_use]
    pub fn above_trend(&self) -> bool {
        self.trend_baseline
            .is_some_and(|baseline| self.reference_price > baseline)
    }
}
