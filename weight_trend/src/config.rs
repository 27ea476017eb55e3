//! Layered configuration for trend analysis
//!
//! Priority (highest to lowest):
//! 1. Environment variables prefixed `WEIGHT_TREND_`, nested keys split on `__`
//!    (e.g. `WEIGHT_TREND_PROJECTION__HORIZON_MONTHS=3`)
//! 2. JSON config file
//! 3. TOML config file
//! 4. Default values

use crate::error::{Result, TrendError};
use crate::projection::ProjectionConfig;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "WEIGHT_TREND_";

/// Recent-count restrictions offered when none are configured
pub const DEFAULT_RECENT_COUNT_CHOICES: [usize; 6] = [2, 3, 4, 5, 7, 10];

/// Settings for an analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Trend fitting and projection
    pub projection: ProjectionConfig,
    /// Calendar months shown when no explicit window is given
    pub default_window_months: u32,
    /// Recent-count restrictions a user may pick from
    pub recent_count_choices: Vec<usize>,
    /// Log filter directive (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            projection: ProjectionConfig::default(),
            default_window_months: 1,
            recent_count_choices: DEFAULT_RECENT_COUNT_CHOICES.to_vec(),
            log_level: "info".to_string(),
        }
    }
}

impl AnalysisConfig {
    /// Defaults overridden by the environment
    pub fn load() -> Result<Self> {
        Self::extract(Self::base_figment())
    }

    /// Defaults overridden by a TOML or JSON file, then by the environment
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                TrendError::ConfigError("Config file must have an extension".to_string())
            })?;

        match extension {
            "toml" => Self::load_layered(Some(path), None),
            "json" => Self::load_layered(None, Some(path)),
            _ => Err(TrendError::ConfigError(format!(
                "Unsupported config file format: {}",
                extension
            ))),
        }
    }

    /// Defaults overridden by an optional TOML file, then an optional JSON
    /// file, then the environment. A path that is given must exist.
    pub fn load_layered(toml: Option<&Path>, json: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(path) = toml {
            figment = figment.merge(Toml::file(require_file(path)?));
        }
        if let Some(path) = json {
            figment = figment.merge(Json::file(require_file(path)?));
        }
        Self::extract(figment.merge(Self::env()))
    }

    fn base_figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Self::env())
    }

    fn env() -> Env {
        Env::prefixed(ENV_PREFIX).split("__")
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde alone cannot rule out
    pub fn validate(&self) -> Result<()> {
        self.projection.validate()?;
        if self.default_window_months == 0 {
            return Err(TrendError::InvalidParameter(
                "Default window must cover at least one month".to_string(),
            ));
        }
        if let Some(&count) = self.recent_count_choices.iter().find(|&&c| c < 2) {
            return Err(TrendError::InvalidParameter(format!(
                "Recent count choices must be at least 2, got {}",
                count
            )));
        }
        Ok(())
    }

    /// The configured projection restricted to one of the offered recent counts
    pub fn projection_with_recent_count(&self, count: usize) -> Result<ProjectionConfig> {
        if !self.recent_count_choices.contains(&count) {
            return Err(TrendError::InvalidParameter(format!(
                "Recent count {} is not one of {:?}",
                count, self.recent_count_choices
            )));
        }
        self.projection.with_recent_count(count)
    }
}

fn require_file(path: &Path) -> Result<&Path> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(TrendError::ConfigError(format!(
            "Config file not found: {}",
            path.display()
        )))
    }
}
