// =============================================================================
// Signals Module
// =============================================================================
//
// Turns indicator values into alert input:
// - Zone classification against a threshold pair
// - Alert rule configuration (read-only here)
// - Stateless trigger detection over consecutive values

pub mod detector;
pub mod rule;
pub mod zone;

pub use detector::{detect, detect_series, TriggerBoundary, TriggerEvent, TriggerKind};
pub use rule::{AlertMode, AlertRule, AlertRuleConfig};
pub use zone::{classify, classify_series};
