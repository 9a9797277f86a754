use satellite_core::{
    DailyPriceSeries, ExclusionReason, InstrumentRef, PriceHistoryProvider,
};
use tracing::{info, warn};

/// Fetches daily history for every universe entry, in universe order.
///
/// Provider failures are converted into exclusion reasons so that a single
/// bad ticker never aborts the run.
pub async fn fetch_histories(
    provider: &dyn PriceHistoryProvider,
    universe: Vec<InstrumentRef>,
) -> Vec<(InstrumentRef, Result<DailyPriceSeries, ExclusionReason>)> {
    info!(
        "Fetching history for {} instruments via {}",
        universe.len(),
        provider.name()
    );

    let mut histories = Vec::with_capacity(universe.len());
    for instrument in universe {
        info!("Processing data for: {}", instrument.ticker);
        let history = match provider.daily_history(&instrument.ticker).await {
            Ok(series) => Ok(series),
            Err(e) => {
                warn!("Data retrieval failed for {}: {}", instrument.ticker, e);
                Err(ExclusionReason::from(e))
            }
        };
        histories.push((instrument, history));
    }
    histories
}
