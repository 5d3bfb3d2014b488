// =============================================================================
// Williams %R
// =============================================================================
//
//   %R = (highest_high - close) / (highest_high - lowest_low) * -100
//
// over trailing windows of `period`.  Range is [-100, 0]; a flat window
// yields -50.  Output element `i` aligns with candle index `period - 1 + i`.
// =============================================================================

use tracing::debug;

use super::rolling::rolling_extremes;

/// Compute the Williams %R series.
///
/// Returns an empty vec when `period == 0`, the slices disagree in length,
/// or there are fewer than `period` candles.
pub fn calculate_williams_r(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Vec<f64> {
    let n = closes.len();
    if period == 0 || highs.len() != n || lows.len() != n || n < period {
        debug!(len = n, period, "williams %r: insufficient or inconsistent data");
        return Vec::new();
    }

    rolling_extremes(highs, lows, period)
        .into_iter()
        .enumerate()
        .map(|(i, (highest, lowest))| {
            let close = closes[i + period - 1];
            let range = highest - lowest;
            if range == 0.0 {
                -50.0
            } else {
                ((highest - close) / range * -100.0).clamp(-100.0, 0.0)
            }
        })
        .collect()
}
