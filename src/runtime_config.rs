// =============================================================================
// Engine Configuration — indicator defaults and alert rules with atomic save
// =============================================================================
//
// All fields carry `#[serde(default)]` so that adding new fields never breaks
// loading an older config file.  Persistence uses a tmp + rename pattern.
//
// =============================================================================

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::EngineError;
use crate::signals::AlertRule;
use crate::types::{ExtraParams, IndicatorKind, IndicatorType, DEFAULT_STOCHASTIC_D_PERIOD};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_period() -> usize {
    14
}

fn default_d_period() -> usize {
    DEFAULT_STOCHASTIC_D_PERIOD
}

fn default_cache_ttl_secs() -> u64 {
    60
}

// =============================================================================
// StochasticDefaults
// =============================================================================

/// Parameters used for a new Stochastic chart when the user picked none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StochasticDefaults {
    #[serde(default = "default_period")]
    pub k_period: usize,

    #[serde(default = "default_d_period")]
    pub d_period: usize,

    /// Slow %K width; absent or 1 means fast Stochastic.
    #[serde(default)]
    pub slow_period: Option<usize>,

    /// Extra %D smoothing width; absent or 1 means none.
    #[serde(default)]
    pub smooth_period: Option<usize>,
}

impl Default for StochasticDefaults {
    fn default() -> Self {
        Self {
            k_period: default_period(),
            d_period: default_d_period(),
            slow_period: None,
            smooth_period: None,
        }
    }
}

// =============================================================================
// EngineConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    // --- Indicator defaults --------------------------------------------------

    #[serde(default = "default_period")]
    pub rsi_period: usize,

    #[serde(default)]
    pub stochastic: StochasticDefaults,

    #[serde(default = "default_period")]
    pub williams_period: usize,

    // --- Caching -------------------------------------------------------------

    /// Lifetime of a cached indicator series, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    // --- Alerts --------------------------------------------------------------

    #[serde(default)]
    pub rules: Vec<AlertRule>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rsi_period: default_period(),
            stochastic: StochasticDefaults::default(),
            williams_period: default_period(),
            cache_ttl_secs: default_cache_ttl_secs(),
            rules: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse engine config from {}", path.display()))?;

        for rule in &config.rules {
            if let Err(e) = rule.kind() {
                warn!(rule = %rule.id, error = %e, "rule has unusable indicator parameters");
            }
        }

        info!(
            path = %path.display(),
            rules = config.rules.len(),
            "engine config loaded"
        );

        Ok(config)
    }

    /// Persist to `path` atomically (write `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise engine config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "engine config saved (atomic)");
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Default parameterisation for a chart of `indicator`.
    pub fn default_kind(&self, indicator: IndicatorType) -> Result<IndicatorKind, EngineError> {
        match indicator {
            IndicatorType::Rsi => {
                IndicatorKind::resolve(indicator, self.rsi_period, &ExtraParams::default())
            }
            IndicatorType::WilliamsR => {
                IndicatorKind::resolve(indicator, self.williams_period, &ExtraParams::default())
            }
            IndicatorType::Stochastic => {
                let extra = ExtraParams {
                    d_period: Some(self.stochastic.d_period),
                    slow_period: self.stochastic.slow_period,
                    smooth_period: self.stochastic.smooth_period,
                };
                IndicatorKind::resolve(indicator, self.stochastic.k_period, &extra)
            }
        }
    }

    pub fn enabled_rules(&self) -> impl Iterator<Item = &AlertRule> {
        self.rules.iter().filter(|r| r.enabled)
    }
}
