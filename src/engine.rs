// =============================================================================
// Indicator Facade — single entry point for chart history and live updates
// =============================================================================
//
// `compute_history` serves the historical-chart path (full recompute) and
// `compute_incremental` the live path (one new candle plus carried state).
// Only RSI carries state; the window-based kinds reject incremental requests
// with `EngineError::UnsupportedOperation` so callers recompute instead.
//
// `compute_latest` wraps both: it continues from the previous point when it
// can and silently falls back to a recompute when it cannot.
// =============================================================================

use tracing::debug;

use crate::error::EngineError;
use crate::indicators::{
    calculate_rsi, calculate_rsi_incremental, calculate_stochastic, calculate_williams_r,
    StochasticParams,
};
use crate::types::{
    Candle, CandleSeries, ExtraParams, IndicatorKind, IndicatorPoint, IndicatorState,
    IndicatorType,
};

/// Resolve parameters and compute the full aligned series.
///
/// An empty vec means "not enough candles yet"; an error means the
/// parameters themselves are unusable.
pub fn compute_history(
    candles: &CandleSeries,
    indicator: IndicatorType,
    period: usize,
    extra: &ExtraParams,
) -> Result<Vec<IndicatorPoint>, EngineError> {
    let kind = IndicatorKind::resolve(indicator, period, extra)?;
    Ok(compute_kind_history(candles, &kind))
}

/// Compute the full series for an already-resolved kind.
pub fn compute_kind_history(candles: &CandleSeries, kind: &IndicatorKind) -> Vec<IndicatorPoint> {
    let bars = candles.candles();

    let points: Vec<IndicatorPoint> = match *kind {
        IndicatorKind::Rsi { period } => {
            let closes = candles.closes();
            calculate_rsi(&closes, period)
                .into_iter()
                .enumerate()
                .map(|(i, rsi)| {
                    let bar = &bars[period + i];
                    IndicatorPoint {
                        timestamp: bar.timestamp,
                        value: rsi.value,
                        close: bar.close,
                        k_line: None,
                        state: Some(IndicatorState::Rsi(rsi.state)),
                    }
                })
                .collect()
        }
        IndicatorKind::Stochastic {
            k_period,
            d_period,
            slow_period,
            smooth_period,
        } => {
            let params = StochasticParams {
                k_period,
                d_period,
                slow_period,
                smooth_period,
            };
            let out = calculate_stochastic(
                &candles.highs(),
                &candles.lows(),
                &candles.closes(),
                &params,
            );
            out.d
                .iter()
                .zip(out.k.iter())
                .enumerate()
                .map(|(i, (&d, &k))| {
                    let bar = &bars[out.first_index + i];
                    IndicatorPoint {
                        timestamp: bar.timestamp,
                        value: d,
                        close: bar.close,
                        k_line: Some(k),
                        state: None,
                    }
                })
                .collect()
        }
        IndicatorKind::WilliamsR { period } => {
            calculate_williams_r(&candles.highs(), &candles.lows(), &candles.closes(), period)
                .into_iter()
                .enumerate()
                .map(|(i, value)| {
                    let bar = &bars[period - 1 + i];
                    IndicatorPoint {
                        timestamp: bar.timestamp,
                        value,
                        close: bar.close,
                        k_line: None,
                        state: None,
                    }
                })
                .collect()
        }
    };

    if points.is_empty() {
        debug!(kind = %kind, candles = candles.len(), "indicator not yet available");
    }
    points
}

/// Advance a series by one candle from carried state.
///
/// `prior == None` seeds RSI from the single `previous -> current` delta.
/// Stochastic and Williams %R always return `UnsupportedOperation`.
pub fn compute_incremental(
    kind: &IndicatorKind,
    current: &Candle,
    previous: &Candle,
    prior: Option<&IndicatorState>,
) -> Result<IndicatorPoint, EngineError> {
    match *kind {
        IndicatorKind::Rsi { period } => {
            if period == 0 {
                return Err(EngineError::InvalidParameter(
                    "RSI period must be at least 1".to_string(),
                ));
            }
            let prior = prior.map(|IndicatorState::Rsi(state)| state);
            let rsi = calculate_rsi_incremental(current.close, previous.close, prior, period);
            Ok(IndicatorPoint {
                timestamp: current.timestamp,
                value: rsi.value,
                close: current.close,
                k_line: None,
                state: Some(IndicatorState::Rsi(rsi.state)),
            })
        }
        IndicatorKind::Stochastic { .. } | IndicatorKind::WilliamsR { .. } => {
            Err(EngineError::UnsupportedOperation {
                kind: kind.indicator_type(),
            })
        }
    }
}

/// Latest point for the live path.
///
/// Continues incrementally when `previous` carries state and sits on the
/// second-to-last candle; otherwise recomputes the full history and takes
/// its last point.  `Ok(None)` means not enough candles yet.
pub fn compute_latest(
    candles: &CandleSeries,
    kind: &IndicatorKind,
    previous: Option<&IndicatorPoint>,
) -> Result<Option<IndicatorPoint>, EngineError> {
    let bars = candles.candles();

    if let (Some(prev), [.., before_last, last]) = (previous, bars) {
        if prev.state.is_some() && prev.timestamp == before_last.timestamp {
            match compute_incremental(kind, last, before_last, prev.state.as_ref()) {
                Ok(point) => return Ok(Some(point)),
                Err(e) if e.is_unsupported() => {
                    debug!(kind = %kind, "incremental unsupported, recomputing history");
                }
                Err(e) => return Err(e),
            }
        }
    }

    Ok(compute_kind_history(candles, kind).last().copied())
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn series(closes: &[f64]) -> CandleSeries {
        CandleSeries::new(
            closes
                .iter()
                .enumerate()
                .map(|(i, &c)| Candle {
                    timestamp: 1_000 * i as i64,
                    open: c,
                    high: c + 1.0,
                    low: c - 1.0,
                    close: c,
                    volume: 10.0,
                })
                .collect(),
        )
    }

    fn wave(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.45).sin() * 4.0 + (i as f64 * 0.13).cos())
            .collect()
    }

    #[test]
    fn rsi_history_aligns_to_candles() {
        let closes = wave(30);
        let candles = series(&closes);
        let points = compute_history(&candles, IndicatorType::Rsi, 14, &ExtraParams::default())
            .unwrap();
        assert_eq!(points.len(), 16);
        assert_eq!(points[0].timestamp, 14_000);
        assert_eq!(points[0].close, closes[14]);
        assert!(points.iter().all(|p| p.state.is_some() && p.k_line.is_none()));
    }

    #[test]
    fn stochastic_history_uses_d_as_value() {
        let closes = wave(40);
        let candles = series(&closes);
        let extra = ExtraParams {
            d_period: Some(3),
            slow_period: Some(3),
            smooth_period: None,
        };
        let points =
            compute_history(&candles, IndicatorType::Stochastic, 14, &extra).unwrap();
        // first index = 14 + 2 + 3 - 2 = 17
        assert_eq!(points.len(), 40 - 17);
        assert_eq!(points[0].timestamp, 17_000);
        assert_eq!(points[0].close, closes[17]);

        let out = calculate_stochastic(
            &candles.highs(),
            &candles.lows(),
            &candles.closes(),
            &StochasticParams {
                k_period: 14,
                d_period: 3,
                slow_period: Some(3),
                smooth_period: None,
            },
        );
        assert_eq!(points[0].value, out.d[0]);
        assert_eq!(points[0].k_line, Some(out.k[0]));
        assert!(points.iter().all(|p| p.state.is_none()));
    }

    #[test]
    fn williams_history_aligns_to_candles() {
        let candles = series(&wave(20));
        let points =
            compute_history(&candles, IndicatorType::WilliamsR, 14, &ExtraParams::default())
                .unwrap();
        assert_eq!(points.len(), 7);
        assert_eq!(points[0].timestamp, 13_000);
        assert!(points.iter().all(|p| (-100.0..=0.0).contains(&p.value)));
    }

    #[test]
    fn insufficient_data_is_empty_not_error() {
        let candles = series(&wave(10));
        let points = compute_history(&candles, IndicatorType::Rsi, 14, &ExtraParams::default());
        assert_eq!(points, Ok(Vec::new()));
    }

    #[test]
    fn invalid_period_is_error() {
        let candles = series(&wave(10));
        let err = compute_history(&candles, IndicatorType::Rsi, 0, &ExtraParams::default())
            .unwrap_err();
        assert!(!err.is_unsupported());
    }

    #[test]
    fn incremental_rejects_window_kinds() {
        let candles = series(&wave(3));
        let bars = candles.candles();
        for kind in [
            IndicatorKind::WilliamsR { period: 14 },
            IndicatorKind::Stochastic {
                k_period: 14,
                d_period: 3,
                slow_period: None,
                smooth_period: None,
            },
        ] {
            let err = compute_incremental(&kind, &bars[1], &bars[0], None).unwrap_err();
            assert!(err.is_unsupported());
        }
    }

    #[test]
    fn incremental_rsi_continues_history() {
        let closes = wave(40);
        let candles = series(&closes);
        let kind = IndicatorKind::Rsi { period: 14 };
        let history = compute_kind_history(&candles, &kind);
        let bars = candles.candles();

        let mut prev = history[0];
        for (i, expected) in history.iter().enumerate().skip(1) {
            let idx = 14 + i;
            let next =
                compute_incremental(&kind, &bars[idx], &bars[idx - 1], prev.state.as_ref())
                    .unwrap();
            assert_eq!(&next, expected);
            prev = next;
        }
    }

    #[test]
    fn incremental_rsi_rejects_zero_period() {
        let candles = series(&wave(3));
        let bars = candles.candles();
        let err = compute_incremental(&IndicatorKind::Rsi { period: 0 }, &bars[1], &bars[0], None)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter(_)));
    }

    #[test]
    fn latest_uses_incremental_for_rsi() {
        let closes = wave(30);
        let kind = IndicatorKind::Rsi { period: 14 };
        let shorter = series(&closes[..29]);
        let full = series(&closes);

        let prev = compute_kind_history(&shorter, &kind).last().copied();
        let latest = compute_latest(&full, &kind, prev.as_ref()).unwrap().unwrap();
        let expected = *compute_kind_history(&full, &kind).last().unwrap();
        assert_eq!(latest, expected);
    }

    #[test]
    fn latest_falls_back_for_stochastic() {
        let closes = wave(40);
        let kind = IndicatorKind::Stochastic {
            k_period: 14,
            d_period: 3,
            slow_period: None,
            smooth_period: None,
        };
        let full = series(&closes);
        let mut prev = *compute_kind_history(&series(&closes[..39]), &kind)
            .last()
            .unwrap();
        // Pretend the caller attached state anyway.
        prev.state = Some(IndicatorState::Rsi(crate::types::RsiState {
            average_gain: 1.0,
            average_loss: 1.0,
        }));
        let latest = compute_latest(&full, &kind, Some(&prev)).unwrap().unwrap();
        assert_eq!(latest, *compute_kind_history(&full, &kind).last().unwrap());
    }

    #[test]
    fn latest_without_enough_data_is_none() {
        let kind = IndicatorKind::WilliamsR { period: 14 };
        assert_eq!(compute_latest(&series(&wave(5)), &kind, None), Ok(None));
    }
}
