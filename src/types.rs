// =============================================================================
// Shared types used across the oscillator engine
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::EngineError;

// =============================================================================
// Candles
// =============================================================================

/// A single OHLCV candle.  `timestamp` is the open time in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Candle {
    /// Whether the candle satisfies the price invariants on its own
    /// (ordering against neighbours is checked by [`CandleSeries::new`]).
    pub fn is_well_formed(&self) -> bool {
        let prices_finite = [self.open, self.high, self.low, self.close]
            .iter()
            .all(|p| p.is_finite());

        prices_finite
            && self.high >= self.low
            && self.high > 0.0
            && self.low > 0.0
            && self.volume.is_finite()
            && self.volume >= 0.0
    }
}

/// Validated, strictly time-ascending candle sequence (index 0 = oldest).
///
/// Malformed rows are dropped on construction rather than failing the whole
/// series.  A candle whose timestamp does not advance past the last kept
/// candle is treated as malformed too.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandleSeries {
    candles: Vec<Candle>,
    dropped: usize,
}

impl CandleSeries {
    pub fn new(raw: Vec<Candle>) -> Self {
        let total = raw.len();
        let mut candles: Vec<Candle> = Vec::with_capacity(total);

        for candle in raw {
            if !candle.is_well_formed() {
                continue;
            }
            if let Some(last) = candles.last() {
                if candle.timestamp <= last.timestamp {
                    continue;
                }
            }
            candles.push(candle);
        }

        let dropped = total - candles.len();
        if dropped > 0 {
            warn!(dropped, kept = candles.len(), "dropped malformed candles");
        }

        Self { candles, dropped }
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Number of rows discarded during validation.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.low).collect()
    }
}

impl From<Vec<Candle>> for CandleSeries {
    fn from(raw: Vec<Candle>) -> Self {
        Self::new(raw)
    }
}

// Serialised as the bare candle array; deserialising re-runs validation.
impl Serialize for CandleSeries {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.candles.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CandleSeries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = Vec::<Candle>::deserialize(deserializer)?;
        Ok(Self::new(raw))
    }
}

/// Render an epoch-millisecond timestamp for log output.
pub fn format_timestamp(timestamp_ms: i64) -> String {
    match chrono::DateTime::from_timestamp_millis(timestamp_ms) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => timestamp_ms.to_string(),
    }
}

// =============================================================================
// Indicator selection
// =============================================================================

/// The indicator family, without parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndicatorType {
    Rsi,
    Stochastic,
    WilliamsR,
}

impl IndicatorType {
    /// Alert levels the app pre-fills when a user creates a rule.
    pub fn default_levels(&self) -> Vec<f64> {
        match self {
            Self::Rsi => vec![30.0, 70.0],
            Self::Stochastic => vec![20.0, 80.0],
            Self::WilliamsR => vec![-80.0, -20.0],
        }
    }
}

impl std::fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rsi => write!(f, "RSI"),
            Self::Stochastic => write!(f, "Stochastic"),
            Self::WilliamsR => write!(f, "Williams %R"),
        }
    }
}

/// Kind-specific extra parameters as supplied by a caller.  Absent values
/// fall back to the defaults applied in [`IndicatorKind::resolve`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraParams {
    #[serde(default)]
    pub d_period: Option<usize>,
    #[serde(default)]
    pub slow_period: Option<usize>,
    #[serde(default)]
    pub smooth_period: Option<usize>,
}

pub const DEFAULT_STOCHASTIC_D_PERIOD: usize = 3;

/// Fully parameterised indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum IndicatorKind {
    Rsi {
        period: usize,
    },
    Stochastic {
        k_period: usize,
        d_period: usize,
        slow_period: Option<usize>,
        smooth_period: Option<usize>,
    },
    WilliamsR {
        period: usize,
    },
}

impl IndicatorKind {
    /// Build a parameterised kind from a type, its main period and the
    /// optional extras, applying Stochastic defaults where absent.
    ///
    /// Zero periods are rejected.  Extras that do not apply to the kind are
    /// ignored.
    pub fn resolve(
        indicator: IndicatorType,
        period: usize,
        extra: &ExtraParams,
    ) -> Result<Self, EngineError> {
        if period == 0 {
            return Err(EngineError::InvalidParameter(format!(
                "{indicator} period must be at least 1"
            )));
        }

        match indicator {
            IndicatorType::Rsi => Ok(Self::Rsi { period }),
            IndicatorType::WilliamsR => Ok(Self::WilliamsR { period }),
            IndicatorType::Stochastic => {
                let d_period = extra.d_period.unwrap_or(DEFAULT_STOCHASTIC_D_PERIOD);
                if d_period == 0 {
                    return Err(EngineError::InvalidParameter(
                        "stochastic d_period must be at least 1".to_string(),
                    ));
                }
                // A width of 0 or 1 means "no extra smoothing stage".
                let slow_period = extra.slow_period.filter(|&p| p > 1);
                let smooth_period = extra.smooth_period.filter(|&p| p > 1);
                Ok(Self::Stochastic {
                    k_period: period,
                    d_period,
                    slow_period,
                    smooth_period,
                })
            }
        }
    }

    pub fn indicator_type(&self) -> IndicatorType {
        match self {
            Self::Rsi { .. } => IndicatorType::Rsi,
            Self::Stochastic { .. } => IndicatorType::Stochastic,
            Self::WilliamsR { .. } => IndicatorType::WilliamsR,
        }
    }
}

impl std::fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rsi { period } => write!(f, "RSI({period})"),
            Self::WilliamsR { period } => write!(f, "Williams %R({period})"),
            Self::Stochastic {
                k_period,
                d_period,
                slow_period,
                smooth_period,
            } => {
                write!(f, "Stochastic({k_period},{d_period}")?;
                if let Some(slow) = slow_period {
                    write!(f, ",slow={slow}")?;
                }
                if let Some(smooth) = smooth_period {
                    write!(f, ",smooth={smooth}")?;
                }
                write!(f, ")")
            }
        }
    }
}

// =============================================================================
// Carried state and output points
// =============================================================================

/// Wilder averages carried between RSI steps.  Both are >= 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiState {
    pub average_gain: f64,
    pub average_loss: f64,
}

/// State threaded by the caller to continue a series incrementally.
/// Only RSI has one; the window-based kinds must be recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum IndicatorState {
    Rsi(RsiState),
}

/// One output value, aligned to exactly one input candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    pub timestamp: i64,
    /// The value used for zones and triggers (%D for Stochastic).
    pub value: f64,
    pub close: f64,
    /// Displayed %K (slow-smoothed when active).  Stochastic only.
    #[serde(default)]
    pub k_line: Option<f64>,
    #[serde(default)]
    pub state: Option<IndicatorState>,
}

// =============================================================================
// Zones
// =============================================================================

/// Position of a value relative to a (lower, upper) threshold pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    Below,
    Between,
    Above,
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Below => write!(f, "Below"),
            Self::Between => write!(f, "Between"),
            Self::Above => write!(f, "Above"),
        }
    }
}
