use crate::error::ProviderError;
use crate::series::DailyPriceSeries;
use async_trait::async_trait;

/// Source of daily closing prices for a ticker.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    async fn daily_history(&self, ticker: &str) -> Result<DailyPriceSeries, ProviderError>;

    fn name(&self) -> &str;
}
