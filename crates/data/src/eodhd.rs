//! EODHD end-of-day REST client with rate limiting and retries.
//!
//! Fetches `{base_url}{ticker}?api_token=..&from=..&fmt=json` and turns the
//! bar list into a [`DailyPriceSeries`], preferring `adjusted_close`.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate};
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use satellite_core::{
    DailyPriceSeries, PriceHistoryProvider, PricePoint, ProviderConfig, ProviderError,
};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

// =============================================================================
// Constants
// =============================================================================

/// Public token accepted by EODHD for a handful of demo tickers.
pub const DEMO_API_KEY: &str = "demo";

/// Upper bound on a single retry wait.
pub const DEFAULT_MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

// =============================================================================
// API Response Types
// =============================================================================

/// One end-of-day bar. Only the fields used for scoring are decoded.
#[derive(Debug, Clone, Deserialize)]
struct RawEodBar {
    date: NaiveDate,
    close: Option<f64>,
    adjusted_close: Option<f64>,
}

impl RawEodBar {
    fn into_point(self) -> Result<PricePoint, ProviderError> {
        self.adjusted_close
            .or(self.close)
            .map(|close| PricePoint::new(self.date, close))
            .ok_or_else(|| ProviderError::Parse(format!("bar on {} has no close", self.date)))
    }
}

// =============================================================================
// EodhdClient
// =============================================================================

type DirectLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// EODHD price history provider.
///
/// `as_of` anchors the requested window: bars from `as_of - history_days`
/// onward are fetched.
pub struct EodhdClient {
    config: ProviderConfig,
    as_of: NaiveDate,
    http: Client,
    rate_limiter: Arc<DirectLimiter>,
    max_retry_delay: Duration,
}

impl std::fmt::Debug for EodhdClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EodhdClient")
            .field("base_url", &self.config.base_url)
            .field("as_of", &self.as_of)
            .field("requests_per_minute", &self.config.requests_per_minute)
            .finish_non_exhaustive()
    }
}

impl EodhdClient {
    /// Creates a client for runs dated `as_of`.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: ProviderConfig, as_of: NaiveDate) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Network(format!("failed to build HTTP client: {e}")))?;

        let per_minute = NonZeroU32::new(config.requests_per_minute).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)));

        Ok(Self {
            config,
            as_of,
            http,
            rate_limiter,
            max_retry_delay: DEFAULT_MAX_RETRY_DELAY,
        })
    }

    /// Caps how long a single retry may wait.
    #[must_use]
    pub fn with_max_retry_delay(mut self, delay: Duration) -> Self {
        self.max_retry_delay = delay;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// First date requested from the API.
    #[must_use]
    pub fn from_date(&self) -> NaiveDate {
        self.as_of - ChronoDuration::days(self.config.history_days)
    }

    fn api_key(&self) -> &str {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .unwrap_or(DEMO_API_KEY)
    }

    /// Tickers are path segments: letters, digits, `.`, `-` and `_` only.
    fn validate_ticker(ticker: &str) -> Result<&str, ProviderError> {
        let valid = !ticker.is_empty()
            && !ticker.contains("..")
            && ticker
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        if valid {
            Ok(ticker)
        } else {
            Err(ProviderError::Parse(format!("invalid ticker: {ticker:?}")))
        }
    }

    /// One rate-limited request without retries.
    async fn fetch_once(&self, ticker: &str) -> Result<DailyPriceSeries, ProviderError> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.config.base_url, ticker);
        let from = self.from_date().format("%Y-%m-%d").to_string();
        debug!("GET {} from={}", url, from);

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .query(&[
                ("api_token", self.api_key()),
                ("from", from.as_str()),
                ("fmt", "json"),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        let bars: Vec<RawEodBar> = Self::handle_response(ticker, response).await?;
        if bars.is_empty() {
            return Err(ProviderError::not_found(ticker));
        }

        let points = bars
            .into_iter()
            .map(RawEodBar::into_point)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DailyPriceSeries::from_unsorted(points)?)
    }

    /// Handles API response, converting errors appropriately.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        ticker: &str,
        response: reqwest::Response,
    ) -> Result<T, ProviderError> {
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(ProviderError::RateLimit {
                retry_after_secs: retry_after,
            });
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::not_found(ticker));
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::api(status.as_u16(), text));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }
}

fn map_transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(err.to_string())
    } else {
        ProviderError::Network(err.to_string())
    }
}

#[async_trait]
impl PriceHistoryProvider for EodhdClient {
    async fn daily_history(&self, ticker: &str) -> Result<DailyPriceSeries, ProviderError> {
        let ticker = Self::validate_ticker(ticker)?;
        let mut attempt = 0;

        loop {
            match self.fetch_once(ticker).await {
                Ok(series) => return Ok(series),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let delay = Duration::from_secs(e.retry_delay_secs().unwrap_or(1))
                        .min(self.max_retry_delay);
                    warn!(
                        "{} failed ({}), retry {}/{} in {:?}",
                        ticker, e, attempt, self.config.max_retries, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn name(&self) -> &str {
        "eodhd"
    }
}
