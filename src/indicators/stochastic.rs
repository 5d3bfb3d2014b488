// =============================================================================
// Stochastic Oscillator — fast / slow %K, %D, optional %D smoothing
// =============================================================================
//
// Stage 1 — raw %K over trailing `k_period` windows:
//             %K = (close - lowest_low) / (highest_high - lowest_low) * 100
//           A flat window (highest_high == lowest_low) yields 50.
// Stage 2 — slow %K: SMA(raw %K, slow_period) when slow_period > 1.
// Stage 3 — %D: SMA(%K, d_period).
// Stage 4 — smoothed %D: SMA(%D, smooth_period) when smooth_period > 1.
//
// Each SMA stage of width `w` drops `w - 1` leading elements, so the first
// output aligns with candle index
//
//   k_period + slow_offset + d_period - 2 + smooth_offset
//
// and every later output advances by one candle.  `first_output_index` is the
// only place that formula lives.
//
// %D (after optional smoothing) is the oscillator value; %K is carried along
// for display only.
// =============================================================================

use tracing::debug;

use super::rolling::{rolling_extremes, sma};

/// Parameters of one Stochastic configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StochasticParams {
    pub k_period: usize,
    pub d_period: usize,
    pub slow_period: Option<usize>,
    pub smooth_period: Option<usize>,
}

impl StochasticParams {
    /// Width of the slow %K stage, if active.
    fn active_slow(&self) -> Option<usize> {
        self.slow_period.filter(|&p| p > 1)
    }

    /// Width of the extra %D smoothing stage, if active.
    fn active_smooth(&self) -> Option<usize> {
        self.smooth_period.filter(|&p| p > 1)
    }

    fn slow_offset(&self) -> usize {
        self.active_slow().map_or(0, |p| p - 1)
    }

    fn smooth_offset(&self) -> usize {
        self.active_smooth().map_or(0, |p| p - 1)
    }

    /// Candle index that output element 0 aligns with.
    ///
    /// Requires `k_period >= 1` and `d_period >= 1`.
    pub fn first_output_index(&self) -> usize {
        self.k_period + self.slow_offset() + self.d_period - 2 + self.smooth_offset()
    }

    /// Fewest candles that yield at least one output element.
    pub fn min_candles(&self) -> usize {
        self.first_output_index() + 1
    }
}

/// Aligned Stochastic output.  `k[i]`, `d[i]` belong to candle
/// `first_index + i`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StochasticOutput {
    pub first_index: usize,
    /// Displayed %K (slow-smoothed when the slow stage is active).
    pub k: Vec<f64>,
    /// %D, after the optional extra smoothing.
    pub d: Vec<f64>,
}

impl StochasticOutput {
    pub fn len(&self) -> usize {
        self.d.len()
    }

    pub fn is_empty(&self) -> bool {
        self.d.is_empty()
    }
}

/// Stage 1: raw %K for every trailing window of `k_period`.
///
/// Output element `j` aligns with candle index `j + k_period - 1`.
pub fn raw_k(highs: &[f64], lows: &[f64], closes: &[f64], k_period: usize) -> Vec<f64> {
    let n = highs.len().min(lows.len()).min(closes.len());
    if k_period == 0 || n < k_period {
        return Vec::new();
    }

    rolling_extremes(&highs[..n], &lows[..n], k_period)
        .into_iter()
        .enumerate()
        .map(|(j, (highest, lowest))| {
            let close = closes[j + k_period - 1];
            let range = highest - lowest;
            if range == 0.0 {
                50.0
            } else {
                ((close - lowest) / range * 100.0).clamp(0.0, 100.0)
            }
        })
        .collect()
}

/// Stage 2: the %K line shown to users.  Identity when no slow stage.
pub fn slow_k(raw: &[f64], slow_period: Option<usize>) -> Vec<f64> {
    match slow_period.filter(|&p| p > 1) {
        Some(width) => sma(raw, width),
        None => raw.to_vec(),
    }
}

/// Stage 3: %D signal line.
pub fn d_line(k: &[f64], d_period: usize) -> Vec<f64> {
    sma(k, d_period)
}

/// Stage 4: optional extra smoothing of %D.
pub fn smooth_d(d: &[f64], smooth_period: Option<usize>) -> Vec<f64> {
    match smooth_period.filter(|&p| p > 1) {
        Some(width) => sma(d, width),
        None => d.to_vec(),
    }
}

/// Run all stages and trim %K so both lines share output alignment.
///
/// Returns an empty output when any period is zero, the slices disagree in
/// length, or there are fewer than [`StochasticParams::min_candles`] candles.
pub fn calculate_stochastic(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    params: &StochasticParams,
) -> StochasticOutput {
    let n = closes.len();
    if params.k_period == 0 || params.d_period == 0 {
        return StochasticOutput::default();
    }
    if highs.len() != n || lows.len() != n {
        debug!(
            highs = highs.len(),
            lows = lows.len(),
            closes = n,
            "stochastic: input length mismatch"
        );
        return StochasticOutput::default();
    }
    if n < params.min_candles() {
        debug!(len = n, required = params.min_candles(), "stochastic: insufficient data");
        return StochasticOutput::default();
    }

    let raw = raw_k(highs, lows, closes, params.k_period);
    let k = slow_k(&raw, params.active_slow());
    let d = d_line(&k, params.d_period);
    let d = smooth_d(&d, params.active_smooth());

    // %K leads %D by the %D and smoothing stage widths.
    let k_skip = params.d_period - 1 + params.smooth_offset();
    let k: Vec<f64> = k[k_skip..].to_vec();
    debug_assert_eq!(k.len(), d.len());
    debug_assert_eq!(d.len(), n - params.first_output_index());

    StochasticOutput {
        first_index: params.first_output_index(),
        k,
        d,
    }
}
