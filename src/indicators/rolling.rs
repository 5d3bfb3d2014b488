// =============================================================================
// Rolling window helpers shared by the window-based oscillators
// =============================================================================
//
// Every helper uses trailing windows: output element `j` covers input
// elements `j ..= j + width - 1`, so an output of a width-`w` helper is
// `w - 1` elements shorter than its input and element `j` aligns with input
// index `j + w - 1`.

/// Simple moving average over trailing windows of `width`.
///
/// Each window is summed from scratch rather than with a running sum, so no
/// rounding error accumulates along long series.
///
/// Returns an empty vec when `width == 0` or the input is shorter than
/// `width`.
pub fn sma(values: &[f64], width: usize) -> Vec<f64> {
    if width == 0 || values.len() < width {
        return Vec::new();
    }

    let width_f = width as f64;
    values
        .windows(width)
        .map(|w| w.iter().sum::<f64>() / width_f)
        .collect()
}

/// Highest high and lowest low of one window.
pub fn window_extremes(highs: &[f64], lows: &[f64]) -> (f64, f64) {
    let highest = highs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let lowest = lows.iter().copied().fold(f64::INFINITY, f64::min);
    (highest, lowest)
}

/// `(highest_high, lowest_low)` for every trailing window of `width`.
pub fn rolling_extremes(highs: &[f64], lows: &[f64], width: usize) -> Vec<(f64, f64)> {
    let n = highs.len().min(lows.len());
    if width == 0 || n < width {
        return Vec::new();
    }

    (width - 1..n)
        .map(|end| {
            let start = end + 1 - width;
            window_extremes(&highs[start..=end], &lows[start..=end])
        })
        .collect()
}
