// =============================================================================
// Alert rule configuration
// =============================================================================
//
// Rules are owned by the alert store; the engine only reads them.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::types::{ExtraParams, IndicatorKind, IndicatorType};

/// How a rule reacts to consecutive indicator values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertMode {
    /// Fire when the value crosses any configured level.
    Cross,
    /// Fire when the value moves into the [lower, upper] band.
    Enter,
    /// Fire when the value leaves the [lower, upper] band.
    Exit,
}

impl std::fmt::Display for AlertMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cross => write!(f, "Cross"),
            Self::Enter => write!(f, "Enter"),
            Self::Exit => write!(f, "Exit"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRuleConfig {
    pub mode: AlertMode,
    #[serde(default)]
    pub levels: Vec<f64>,
}

impl AlertRuleConfig {
    pub fn cross(levels: impl Into<Vec<f64>>) -> Self {
        Self {
            mode: AlertMode::Cross,
            levels: levels.into(),
        }
    }

    pub fn enter(lower: f64, upper: f64) -> Self {
        Self {
            mode: AlertMode::Enter,
            levels: vec![lower, upper],
        }
    }

    pub fn exit(lower: f64, upper: f64) -> Self {
        Self {
            mode: AlertMode::Exit,
            levels: vec![lower, upper],
        }
    }

    /// `(lower, upper)` from the first two levels, ordered.  `None` with
    /// fewer than two levels.
    pub fn band(&self) -> Option<(f64, f64)> {
        match self.levels.as_slice() {
            [a, b, ..] => Some((a.min(*b), a.max(*b))),
            _ => None,
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// A stored alert: which series to watch and how to react.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    pub id: String,
    pub symbol: String,
    pub timeframe: String,
    pub indicator: IndicatorType,
    pub period: usize,
    #[serde(default)]
    pub extra: ExtraParams,
    pub config: AlertRuleConfig,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl AlertRule {
    pub fn kind(&self) -> Result<IndicatorKind, EngineError> {
        IndicatorKind::resolve(self.indicator, self.period, &self.extra)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_orders_levels() {
        assert_eq!(AlertRuleConfig::enter(70.0, 30.0).band(), Some((30.0, 70.0)));
        assert_eq!(AlertRuleConfig::cross(vec![50.0]).band(), None);
    }

    #[test]
    fn rule_deserialises_with_defaults() {
        let json = r#"{
            "id": "r1",
            "symbol": "BTCUSDT",
            "timeframe": "1h",
            "indicator": "Stochastic",
            "period": 14,
            "config": { "mode": "Cross", "levels": [20.0, 80.0] }
        }"#;
        let rule: AlertRule = serde_json::from_str(json).unwrap();
        assert!(rule.enabled);
        assert_eq!(rule.extra, ExtraParams::default());
        assert_eq!(
            rule.kind().unwrap(),
            IndicatorKind::Stochastic {
                k_period: 14,
                d_period: 3,
                slow_period: None,
                smooth_period: None,
            }
        );
    }

    #[test]
    fn mode_display() {
        assert_eq!(AlertMode::Exit.to_string(), "Exit");
    }
}
