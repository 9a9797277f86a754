//! Error types for the satellite strategy.
//!
//! Instrument-level problems are expressed as [`ExclusionReason`]s: they remove a
//! single instrument from the ranking and never abort a run. Configuration and
//! price-provider failures have their own enums.

use crate::metrics::Horizon;
use thiserror::Error;

/// Why an instrument did not make it into the ranking.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExclusionReason {
    /// Fewer daily observations than the trend window needs.
    #[error("insufficient history: {observations} daily observations < {required}")]
    InsufficientHistory {
        /// Daily observations available.
        observations: usize,
        /// Minimum required.
        required: usize,
    },

    /// Too few monthly points after the month-completeness correction.
    #[error("insufficient monthly history: {months} monthly points < {required}")]
    InsufficientMonthlyHistory {
        /// Monthly points available after correction.
        months: usize,
        /// Minimum required.
        required: usize,
    },

    /// A lookback horizon has no monthly point and no fallback applies.
    #[error("insufficient lookback: no price {} back", .horizon.label())]
    InsufficientLookback {
        /// The horizon that could not be resolved.
        horizon: Horizon,
    },

    /// Price history was absent, empty, unordered, or otherwise unusable.
    #[error("provider data malformed: {detail}")]
    ProviderDataMalformed {
        /// Human readable detail.
        detail: String,
    },
}

impl ExclusionReason {
    /// Creates a malformed-data exclusion.
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::ProviderDataMalformed {
            detail: detail.into(),
        }
    }

    /// Stable short code used in reports and exports.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InsufficientHistory { .. } => "insufficient-history",
            Self::InsufficientMonthlyHistory { .. } => "insufficient-monthly-history",
            Self::InsufficientLookback { .. } => "insufficient-lookback",
            Self::ProviderDataMalformed { .. } => "provider-data-malformed",
        }
    }
}

impl From<ProviderError> for ExclusionReason {
    fn from(err: ProviderError) -> Self {
        Self::malformed(err.to_string())
    }
}

/// An instrument that was dropped from the ranking, kept for auditing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusion {
    pub ticker: String,
    pub reason: ExclusionReason,
}

/// Invalid strategy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Weight profile is unusable.
    #[error("invalid weights: {0}")]
    InvalidWeights(String),

    /// A numeric parameter is out of range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name as it appears in the config file.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// Unknown preset name.
    #[error("unknown preset: {0}")]
    UnknownPreset(String),
}

impl ConfigError {
    /// Creates an invalid parameter error.
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Errors raised while retrieving price history.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network error.
    #[error("network error: {0}")]
    Network(String),

    /// Request timeout.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// API request failed.
    #[error("API error: {status_code} - {message}")]
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Error message from API.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimit {
        /// Seconds to wait before retry.
        retry_after_secs: u64,
    },

    /// Response or file could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Local file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// No history exists for the ticker.
    #[error("no price history for {ticker}")]
    NotFound {
        /// The ticker that was requested.
        ticker: String,
    },

    /// History was retrieved but failed validation.
    #[error("invalid price history: {0}")]
    Invalid(#[from] ExclusionReason),
}

impl ProviderError {
    /// Creates an API error from status code and message.
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status_code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(ticker: impl Into<String>) -> Self {
        Self::NotFound {
            ticker: ticker.into(),
        }
    }

    /// Returns true if the error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) | Self::RateLimit { .. } => true,
            Self::Api { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }

    /// Returns the suggested retry delay in seconds, if applicable.
    #[must_use]
    pub fn retry_delay_secs(&self) -> Option<u64> {
        match self {
            Self::RateLimit { retry_after_secs } => Some(*retry_after_secs),
            Self::Network(_) | Self::Timeout(_) => Some(1),
            Self::Api { status_code, .. } if *status_code >= 500 => Some(2),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusion_codes() {
        let reason = ExclusionReason::InsufficientHistory {
            observations: 150,
            required: 200,
        };
        assert_eq!(reason.code(), "insufficient-history");
        assert!(reason.to_string().contains("150"));

        let reason = ExclusionReason::InsufficientLookback {
            horizon: Horizon::TenMonths,
        };
        assert_eq!(reason.code(), "insufficient-lookback");
        assert!(reason.to_string().contains("10M"));
    }

    #[test]
    fn test_provider_error_maps_to_malformed() {
        let reason: ExclusionReason = ProviderError::not_found("GLD.US").into();
        assert_eq!(reason.code(), "provider-data-malformed");
        assert!(reason.to_string().contains("GLD.US"));
    }

    #[test]
    fn test_retryable_errors() {
        assert!(ProviderError::Network("refused".to_string()).is_retryable());
        assert!(ProviderError::api(503, "unavailable").is_retryable());
        assert!(!ProviderError::api(404, "unknown ticker").is_retryable());
        assert!(!ProviderError::Parse("bad json".to_string()).is_retryable());
    }

    #[test]
    fn test_retry_delays() {
        assert_eq!(
            ProviderError::RateLimit {
                retry_after_secs: 30
            }
            .retry_delay_secs(),
            Some(30)
        );
        assert_eq!(ProviderError::api(500, "oops").retry_delay_secs(), Some(2));
        assert_eq!(ProviderError::api(401, "key").retry_delay_secs(), None);
    }
}
