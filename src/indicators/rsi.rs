// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing
// =============================================================================
//
// Step 1 — Seed average gain / average loss with the plain mean of the first
//          `period` gains / losses (deltas of closes 1..=period).
// Step 2 — Apply Wilder's smoothing once per further close:
//            avg_gain = (prev_avg_gain * (period - 1) + current_gain) / period
//            avg_loss = (prev_avg_loss * (period - 1) + current_loss) / period
// Step 3 — RSI = 100                          if avg_loss == 0
//          RSI = 100 - 100 / (1 + RS)         otherwise, RS = avg_gain / avg_loss
//
// The seeded averages already describe one RSI value, at close index
// `period`, so output element `i` aligns with close index `period + i`.
//
// Batch and incremental paths share `wilder_step`, so continuing a batch
// state one close at a time reproduces the batch series bit-for-bit.
// =============================================================================

use tracing::debug;

use crate::types::RsiState;

/// One RSI value together with the averages that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RsiValue {
    pub value: f64,
    pub state: RsiState,
}

/// Compute the full RSI series for the given `closes` and `period`.
///
/// # Edge cases
/// - `period == 0` => empty vec
/// - `closes.len() < period + 1` => empty vec (need at least `period` deltas)
/// - Non-finite results stop the series; everything before is kept.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<RsiValue> {
    if period == 0 || closes.len() < period + 1 {
        debug!(len = closes.len(), period, "rsi: insufficient data");
        return Vec::new();
    }

    // --- Seed averages with the mean of the first `period` deltas ------------
    let (sum_gain, sum_loss) = closes[..=period]
        .windows(2)
        .map(|w| split_delta(w[1] - w[0]))
        .fold((0.0_f64, 0.0_f64), |(g, l), (u, d)| (g + u, l + d));

    let period_f = period as f64;
    let mut state = RsiState {
        average_gain: sum_gain / period_f,
        average_loss: sum_loss / period_f,
    };

    let mut result = Vec::with_capacity(closes.len() - period);
    let first = rsi_from_state(&state);
    if !first.is_finite() {
        return Vec::new();
    }
    result.push(RsiValue { value: first, state });

    // --- Wilder's smoothing for subsequent closes -----------------------------
    for w in closes[period..].windows(2) {
        state = wilder_step(&state, w[1] - w[0], period);
        let value = rsi_from_state(&state);
        if !value.is_finite() {
            break;
        }
        result.push(RsiValue { value, state });
    }

    result
}

/// Advance RSI by one close.
///
/// With a prior state the Wilder recurrence is applied once.  Without one the
/// averages are seeded directly from the single delta (`avg_gain = gain`,
/// `avg_loss = loss`), which does not match the period-averaged batch seed;
/// the live path normally continues from a batch-produced state instead.
pub fn calculate_rsi_incremental(
    current_close: f64,
    previous_close: f64,
    prior: Option<&RsiState>,
    period: usize,
) -> RsiValue {
    let delta = current_close - previous_close;
    let state = match prior {
        Some(prior) => wilder_step(prior, delta, period),
        None => {
            let (gain, loss) = split_delta(delta);
            RsiState {
                average_gain: gain,
                average_loss: loss,
            }
        }
    };

    RsiValue {
        value: rsi_from_state(&state),
        state,
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

/// `(gain, loss)` of a single close-to-close delta; both are >= 0.
fn split_delta(delta: f64) -> (f64, f64) {
    (delta.max(0.0), (-delta).max(0.0))
}

/// One application of Wilder's smoothing.  Returns a fresh state.
fn wilder_step(prior: &RsiState, delta: f64, period: usize) -> RsiState {
    let (gain, loss) = split_delta(delta);
    let period_f = period as f64;
    let keep = (period - 1) as f64;
    RsiState {
        average_gain: (prior.average_gain * keep + gain) / period_f,
        average_loss: (prior.average_loss * keep + loss) / period_f,
    }
}

/// Convert averages into an RSI value in [0, 100].
fn rsi_from_state(state: &RsiState) -> f64 {
    if state.average_loss == 0.0 {
        return 100.0;
    }
    let rs = state.average_gain / state.average_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}
