pub mod allocation;
pub mod engine;
pub mod momentum;
pub mod ranker;
pub mod resampler;
pub mod turnover;

pub use allocation::{allocate, Admission, AllocationBuilder, GroupUsage};
pub use engine::{run_strategy, HistoryInput, MomentumEngine, SatelliteRun, UniverseEvaluation};
pub use momentum::{composite_score, compute_metrics, simple_moving_average};
pub use ranker::Ranking;
pub use resampler::resample_monthly;
pub use turnover::compute_turnover;
