// =============================================================================
// Oscillator Engine — indicator computation and alert signal detection
// =============================================================================
//
// Candles -> indicator kernel -> zone classification -> trigger events.
// Everything here is synchronous and free of shared mutable state; callers
// thread `IndicatorState` between calls themselves.
// =============================================================================

pub mod cache;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod runtime_config;
pub mod signals;
pub mod types;

pub use engine::{compute_history, compute_incremental, compute_kind_history, compute_latest};
pub use error::EngineError;
pub use types::{
    Candle, CandleSeries, ExtraParams, IndicatorKind, IndicatorPoint, IndicatorState,
    IndicatorType, RsiState, Zone,
};
