// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free oscillator kernels.  Every kernel returns an empty
// series when there is not enough data, so callers never have to treat a
// short history as a failure.

pub mod rolling;
pub mod rsi;
pub mod stochastic;
pub mod williams_r;

pub use rsi::{calculate_rsi, calculate_rsi_incremental, RsiValue};
pub use stochastic::{calculate_stochastic, StochasticOutput, StochasticParams};
pub use williams_r::calculate_williams_r;
