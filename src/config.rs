use crate::data::resolution::Resolution;
use crate::data::subscription_config::FilterSuspiciousTicks;
use serde_derive::{Deserialize, Serialize};
use std::time::Duration;

/// Data normalization applied to historical/live prices before they reach a subscription's
/// consolidator (split/dividend adjustment policy).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum DataNormalizationMode {
    Raw,
    Adjusted,
    TotalReturn,
    BackwardsRatio,
    BackwardsPanamaCanal,
    ForwardPanamaCanal,
}

impl Default for DataNormalizationMode {
    fn default() -> Self {
        DataNormalizationMode::Adjusted
    }
}

/// How a continuous future's constituent contract is chosen and spliced.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum DataMappingMode {
    LastTradingDay,
    FirstDayMonth,
    OpenInterest,
}

impl Default for DataMappingMode {
    fn default() -> Self {
        DataMappingMode::OpenInterest
    }
}

/// Process-wide fallbacks for the fields a `SubscriptionRequest` is allowed to omit.
/// Per-subscription overrides always take precedence; this is not consulted once a
/// `SubscriptionDataConfig` has been constructed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoreConfig {
    pub resolution: Resolution,
    pub fill_forward: bool,
    pub extended_market_hours: bool,
    pub warmup_resolution: Resolution,
    pub data_normalization_mode: DataNormalizationMode,
    pub data_mapping_mode: DataMappingMode,
    /// How many contracts out from the front month a continuous future should map to.
    pub contract_depth_offset: u32,
    /// Whether a daily bar's `end_time` is the exchange's precise session close rather
    /// than midnight the following day.
    pub daily_precise_end_time: bool,
    /// Minimum time a security selected by a universe must remain subscribed before it
    /// can be dropped by a subsequent selection.
    pub minimum_time_in_universe: Duration,
    pub filter_suspicious_ticks: FilterSuspiciousTicks,
    /// Cap on the custom-data reader's exponential backoff after a `ReaderFailure`.
    pub reader_backoff_cap: Duration,
}

impl Default for CoreConfig {
    fn default() -> Self {
        CoreConfig {
            resolution: Resolution::Minutes(1),
            fill_forward: true,
            extended_market_hours: false,
            warmup_resolution: Resolution::Minutes(1),
            data_normalization_mode: DataNormalizationMode::default(),
            data_mapping_mode: DataMappingMode::default(),
            contract_depth_offset: 0,
            daily_precise_end_time: false,
            minimum_time_in_universe: Duration::from_secs(24 * 60 * 60),
            filter_suspicious_ticks: FilterSuspiciousTicks::default(),
            reader_backoff_cap: Duration::from_secs(30),
        }
    }
}

impl CoreConfig {
    /// Loads from a TOML file if present, otherwise writes and returns the default
    /// configuration.
    pub fn load_or_default(path: &std::path::Path) -> Result<Self, crate::error::CoreError> {
        if !path.exists() {
            let config = CoreConfig::default();
            let toml_content = toml::to_string(&config).map_err(|e| crate::error::CoreError::Fatal {
                reason: format!("failed to serialize default config: {}", e),
            })?;
            std::fs::write(path, toml_content).map_err(|e| crate::error::CoreError::Fatal {
                reason: format!("failed to write default config to {}: {}", path.display(), e),
            })?;
            return Ok(config);
        }

        let toml_content = std::fs::read_to_string(path).map_err(|e| crate::error::CoreError::Fatal {
            reason: format!("failed to read config at {}: {}", path.display(), e),
        })?;

        toml::from_str(&toml_content).map_err(|e| crate::error::CoreError::Fatal {
            reason: format!("failed to parse config at {}: {}", path.display(), e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let config = CoreConfig::default();
        let serialized = toml::to_string(&config).unwrap();
        let parsed: CoreConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.resolution, config.resolution);
        assert_eq!(parsed.filter_suspicious_ticks, config.filter_suspicious_ticks);
    }
}
