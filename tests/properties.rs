//! Indicator Property Tests
//!
//! Invariants that must hold for any candle sequence: batch/incremental RSI
//! equivalence, Stochastic alignment, value ranges and flat-window stability.

use oscillator_engine::indicators::{calculate_rsi, calculate_stochastic, StochasticParams};
use oscillator_engine::{
    compute_incremental, compute_kind_history, Candle, CandleSeries, IndicatorKind,
};
use proptest::prelude::*;

/// Build a valid series from per-bar (close change, half range) pairs.
fn build_series(steps: &[(f64, f64)]) -> CandleSeries {
    let mut close = 100.0_f64;
    let candles = steps
        .iter()
        .enumerate()
        .map(|(i, &(change, half_range))| {
            close = (close + change).max(1.0);
            Candle {
                timestamp: 60_000 * i as i64,
                open: close,
                high: close + half_range,
                low: (close - half_range).max(0.5),
                close,
                volume: 1.0,
            }
        })
        .collect();
    CandleSeries::new(candles)
}

fn steps(min: usize, max: usize) -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((-5.0f64..5.0, 0.0f64..3.0), min..max)
}

fn optional_width() -> impl Strategy<Value = Option<usize>> {
    prop::option::of(1usize..6)
}

proptest! {
    #[test]
    fn rsi_incremental_matches_batch(period in 1usize..30, bars in steps(2, 120)) {
        let candles = build_series(&bars);
        prop_assume!(candles.len() >= period + 2);

        let kind = IndicatorKind::Rsi { period };
        let batch = compute_kind_history(&candles, &kind);
        prop_assert_eq!(batch.len(), candles.len() - period);

        let bars = candles.candles();
        let mut state = batch[0].state;
        for (i, expected) in batch.iter().enumerate().skip(1) {
            let idx = period + i;
            let step = compute_incremental(&kind, &bars[idx], &bars[idx - 1], state.as_ref())
                .unwrap();
            prop_assert!((step.value - expected.value).abs() <= 1e-9);
            prop_assert_eq!(step.timestamp, expected.timestamp);
            state = step.state;
        }
    }

    #[test]
    fn stochastic_alignment(
        k_period in 1usize..20,
        d_period in 1usize..6,
        slow_period in optional_width(),
        smooth_period in optional_width(),
        bars in steps(1, 150),
    ) {
        let candles = build_series(&bars);
        let kind = IndicatorKind::Stochastic { k_period, d_period, slow_period, smooth_period };
        let points = compute_kind_history(&candles, &kind);

        let slow_offset = slow_period.filter(|&p| p > 1).map_or(0, |p| p - 1);
        let smooth_offset = smooth_period.filter(|&p| p > 1).map_or(0, |p| p - 1);
        let first = k_period + slow_offset + d_period - 2 + smooth_offset;

        if candles.len() > first {
            prop_assert_eq!(points.len(), candles.len() - first);
            for (i, point) in points.iter().enumerate() {
                prop_assert_eq!(point.timestamp, candles.candles()[first + i].timestamp);
                prop_assert_eq!(point.close, candles.candles()[first + i].close);
            }
        } else {
            prop_assert!(points.is_empty());
        }
    }

    #[test]
    fn values_stay_in_range(period in 1usize..25, bars in steps(1, 120)) {
        let candles = build_series(&bars);

        for p in compute_kind_history(&candles, &IndicatorKind::Rsi { period }) {
            prop_assert!((0.0..=100.0).contains(&p.value));
        }
        for p in compute_kind_history(&candles, &IndicatorKind::WilliamsR { period }) {
            prop_assert!((-100.0..=0.0).contains(&p.value));
        }
        let stoch = IndicatorKind::Stochastic {
            k_period: period,
            d_period: 3,
            slow_period: Some(3),
            smooth_period: Some(2),
        };
        for p in compute_kind_history(&candles, &stoch) {
            prop_assert!((0.0..=100.0).contains(&p.value));
            let k = p.k_line.unwrap();
            prop_assert!((0.0..=100.0).contains(&k));
        }
    }

    #[test]
    fn flat_windows_are_neutral(price in 0.01f64..100_000.0, period in 1usize..30, len in 1usize..80) {
        let flat = vec![price; len];
        let params = StochasticParams {
            k_period: period,
            d_period: 1,
            slow_period: None,
            smooth_period: None,
        };
        let out = calculate_stochastic(&flat, &flat, &flat, &params);
        for v in out.k.iter().chain(out.d.iter()) {
            prop_assert_eq!(*v, 50.0);
        }
        let r = oscillator_engine::indicators::calculate_williams_r(&flat, &flat, &flat, period);
        for v in r {
            prop_assert_eq!(v, -50.0);
        }
    }

    #[test]
    fn rsi_never_nan(period in 1usize..20, closes in prop::collection::vec(1.0f64..1000.0, 0..80)) {
        for v in calculate_rsi(&closes, period) {
            prop_assert!(v.value.is_finite());
        }
    }
}
