//! CLI commands for the satellite strategy.

pub mod presets;
pub mod run_signals;

pub use presets::{format_presets, print_presets};
pub use run_signals::{run_satellite, RunArgs};
