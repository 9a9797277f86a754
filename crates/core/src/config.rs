use crate::error::ConfigError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub strategy: StrategyConfig,
    pub provider: ProviderConfig,
    pub output: OutputConfig,
}

/// Parameters of one momentum strategy profile.
///
/// Passed explicitly into the metrics calculator and the allocation engine so
/// that several profiles can be evaluated side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub weights: WeightProfile,
    /// Length of the trend baseline SMA; also the minimum daily history.
    pub trend_window: usize,
    /// Monthly points required after the month-completeness correction.
    pub min_monthly_points: usize,
    /// Top-K ranks eligible for retaining existing holdings.
    pub stability_buffer: usize,
    pub portfolio_slots: usize,
    /// The current month counts as complete from `days_in_month - margin` on.
    pub completeness_margin_days: u32,
    /// Let the 10M lookback fall back to the oldest daily price.
    pub ten_month_fallback: bool,
    pub cash: CashInstrument,
    /// Estimated execution cost per trade.
    pub trade_cost_estimate: Decimal,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self::preset(StrategyPreset::Standard)
    }
}

impl StrategyConfig {
    /// Builds the configuration of a named preset.
    #[must_use]
    pub fn preset(preset: StrategyPreset) -> Self {
        match preset {
            StrategyPreset::Standard => Self {
                weights: WeightProfile::new(4.0, 5.0, 3.0, 2.0),
                trend_window: 200,
                min_monthly_points: 11,
                stability_buffer: 5,
                portfolio_slots: 3,
                completeness_margin_days: 2,
                ten_month_fallback: false,
                cash: CashInstrument::default(),
                trade_cost_estimate: Decimal::new(590, 2),
            },
            StrategyPreset::ShortWindow => Self {
                weights: WeightProfile::new(2.0, 5.0, 4.0, 3.0),
                min_monthly_points: 10,
                stability_buffer: 7,
                ten_month_fallback: true,
                ..Self::preset(StrategyPreset::Standard)
            },
        }
    }

    /// Checks that the parameters describe a runnable strategy.
    ///
    /// # Errors
    /// Returns the first invalid parameter found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;

        if self.trend_window == 0 {
            return Err(ConfigError::invalid("trend_window", "must be positive"));
        }
        if self.stability_buffer == 0 {
            return Err(ConfigError::invalid("stability_buffer", "must be positive"));
        }
        if self.portfolio_slots == 0 {
            return Err(ConfigError::invalid("portfolio_slots", "must be positive"));
        }
        // the 6M lookback sits 7 monthly points back from the reference
        if self.min_monthly_points < 7 {
            return Err(ConfigError::invalid(
                "min_monthly_points",
                format!("{} leaves no 6M lookback (minimum 7)", self.min_monthly_points),
            ));
        }
        if self.min_monthly_points < 11 && !self.ten_month_fallback {
            return Err(ConfigError::invalid(
                "min_monthly_points",
                "below 11 requires ten_month_fallback",
            ));
        }
        if self.cash.ticker.trim().is_empty() {
            return Err(ConfigError::invalid("cash.ticker", "must not be blank"));
        }
        if self.trade_cost_estimate.is_sign_negative() {
            return Err(ConfigError::invalid(
                "trade_cost_estimate",
                "must not be negative",
            ));
        }
        Ok(())
    }
}

/// Named strategy profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyPreset {
    /// Weights {4,5,3,2}, 11 monthly points, top-5 buffer.
    Standard,
    /// Weights {2,5,4,3}, 10 monthly points with the 10M fallback, top-7 buffer.
    /// Fits providers that serve roughly one year of daily history.
    ShortWindow,
}

impl StrategyPreset {
    pub const ALL: [Self; 2] = [Self::Standard, Self::ShortWindow];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::ShortWindow => "short-window",
        }
    }
}

impl FromStr for StrategyPreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "short-window" | "short_window" => Ok(Self::ShortWindow),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }
}

/// Horizon weights of the composite score; normalized by their sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightProfile {
    pub one_month: f64,
    pub three_months: f64,
    pub six_months: f64,
    pub ten_months: f64,
}

impl WeightProfile {
    #[must_use]
    pub const fn new(one_month: f64, three_months: f64, six_months: f64, ten_months: f64) -> Self {
        Self {
            one_month,
            three_months,
            six_months,
            ten_months,
        }
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.one_month + self.three_months + self.six_months + self.ten_months
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let all = [
            self.one_month,
            self.three_months,
            self.six_months,
            self.ten_months,
        ];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ConfigError::InvalidWeights(format!(
                "weights must be finite and non-negative: {all:?}"
            )));
        }
        if self.total() <= 0.0 {
            return Err(ConfigError::InvalidWeights(
                "weights must not sum to zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Identity of the cash/money-market instrument used for defensive padding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashInstrument {
    pub ticker: String,
    pub name: String,
    pub isin: String,
}

impl Default for CashInstrument {
    fn default() -> Self {
        Self {
            ticker: "YCAA.XETRA".to_string(),
            name: "CASH (Vanguard EUR Cash)".to_string(),
            isin: "IE000SOORXS0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    /// Falls back to the provider's public demo token when unset.
    pub api_key: Option<String>,
    /// Calendar days of daily history requested per instrument.
    pub history_days: i64,
    pub requests_per_minute: u32,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://eodhd.com/api/eod/".to_string(),
            api_key: None,
            history_days: 365,
            requests_per_minute: 60,
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub export_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            export_dir: ".".to_string(),
        }
    }
}
