use crate::config::{AppConfig, StrategyConfig, StrategyPreset};
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

pub const DEFAULT_CONFIG_PATH: &str = "config/Satellite.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads application configuration by merging defaults, the TOML file, and
    /// `SATELLITE_`-prefixed environment variables (nested keys split on `__`).
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be parsed or the strategy
    /// section is invalid.
    pub fn load(path: &str) -> Result<AppConfig> {
        let config: AppConfig = Self::figment(path)
            .extract()
            .with_context(|| format!("Failed to load configuration from {path}"))?;

        config.strategy.validate()?;
        Ok(config)
    }

    /// Loads configuration and replaces the strategy section with a named preset.
    ///
    /// Values for the preset's cash instrument and trade cost still come from the
    /// file when present there.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be parsed.
    pub fn load_with_preset(path: &str, preset: StrategyPreset) -> Result<AppConfig> {
        let mut config = Self::load(path)?;
        let file_strategy = config.strategy;

        config.strategy = StrategyConfig {
            cash: file_strategy.cash,
            trade_cost_estimate: file_strategy.trade_cost_estimate,
            ..StrategyConfig::preset(preset)
        };
        config.strategy.validate()?;

        tracing::info!("Using strategy preset: {}", preset.name());
        Ok(config)
    }

    fn figment(path: &str) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("SATELLITE_").split("__"))
    }
}
