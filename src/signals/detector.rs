// =============================================================================
// Signal Detector — level crosses and band transitions
// =============================================================================
//
// Stateless: every call gets the previous and current value explicitly and
// returns the events for that single step.
//
//   Cross  — per level:  CrossUp   iff prev <= level && cur > level
//                        CrossDown iff prev >= level && cur < level
//   Enter  — prev strictly outside [lower, upper], cur inside (inclusive)
//   Exit   — prev inside (inclusive), cur strictly outside
//
// Enter/Exit need two levels; with fewer the rule cannot fire.  Cooldowns and
// de-duplication across calls belong to the notification dispatcher.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::rule::{AlertMode, AlertRuleConfig};
use crate::types::IndicatorPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerKind {
    CrossUp,
    CrossDown,
    EnterZone,
    ExitZone,
}

impl std::fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CrossUp => write!(f, "CrossUp"),
            Self::CrossDown => write!(f, "CrossDown"),
            Self::EnterZone => write!(f, "EnterZone"),
            Self::ExitZone => write!(f, "ExitZone"),
        }
    }
}

/// The level or band an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TriggerBoundary {
    Level(f64),
    Zone { lower: f64, upper: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerEvent {
    pub kind: TriggerKind,
    pub boundary: TriggerBoundary,
    pub timestamp: i64,
    pub value: f64,
}

/// Evaluate one `(previous, current)` step against a rule.
pub fn detect(
    config: &AlertRuleConfig,
    previous: f64,
    current: f64,
    timestamp: i64,
) -> Vec<TriggerEvent> {
    let event = |kind, boundary| TriggerEvent {
        kind,
        boundary,
        timestamp,
        value: current,
    };

    match config.mode {
        AlertMode::Cross => config
            .levels
            .iter()
            .filter_map(|&level| {
                let boundary = TriggerBoundary::Level(level);
                if previous <= level && current > level {
                    Some(event(TriggerKind::CrossUp, boundary))
                } else if previous >= level && current < level {
                    Some(event(TriggerKind::CrossDown, boundary))
                } else {
                    None
                }
            })
            .collect(),
        AlertMode::Enter | AlertMode::Exit => {
            let Some((lower, upper)) = config.band() else {
                warn!(mode = %config.mode, levels = ?config.levels, "zone rule needs two levels");
                return Vec::new();
            };
            let inside = |v: f64| v >= lower && v <= upper;
            let outside = |v: f64| v < lower || v > upper;
            let boundary = TriggerBoundary::Zone { lower, upper };

            let fired = match config.mode {
                AlertMode::Enter => outside(previous) && inside(current),
                _ => inside(previous) && outside(current),
            };
            let kind = if config.mode == AlertMode::Enter {
                TriggerKind::EnterZone
            } else {
                TriggerKind::ExitZone
            };

            if fired {
                vec![event(kind, boundary)]
            } else {
                Vec::new()
            }
        }
    }
}

/// Run the detector over every consecutive pair of points.  Events carry
/// the timestamp of the later point.
pub fn detect_series(config: &AlertRuleConfig, points: &[IndicatorPoint]) -> Vec<TriggerEvent> {
    points
        .windows(2)
        .flat_map(|w| detect(config, w[0].value, w[1].value, w[1].timestamp))
        .collect()
}
