pub mod config;
pub mod config_loader;
pub mod error;
pub mod instrument;
pub mod metrics;
pub mod portfolio;
pub mod report_formatter;
pub mod series;
pub mod traits;

pub use config::{
    AppConfig, CashInstrument, OutputConfig, ProviderConfig, StrategyConfig, StrategyPreset,
    WeightProfile,
};
pub use config_loader::{ConfigLoader, DEFAULT_CONFIG_PATH};
pub use error::{ConfigError, Exclusion, ExclusionReason, ProviderError};
pub use instrument::InstrumentRef;
pub use metrics::{Horizon, HorizonValues, MomentumMetrics};
pub use portfolio::{Allocation, AllocationSlot, RankedInstrument, SlotAction, TurnoverReport};
pub use report_formatter::ReportFormatter;
pub use series::{DailyPriceSeries, MonthlyPriceSeries, PricePoint};
pub use traits::PriceHistoryProvider;
