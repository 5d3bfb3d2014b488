// =============================================================================
// Zone Classifier
// =============================================================================
//
// lower = levels[0], upper = levels[1] (or 100 when only one level is given).
//   value < lower  => Below
//   value > upper  => Above
//   otherwise      => Between (boundaries are inclusive)
// No levels at all => Between.

use crate::types::{IndicatorPoint, Zone};

/// Upper bound assumed when a single level is configured.
pub const DEFAULT_UPPER_LEVEL: f64 = 100.0;

pub fn classify(value: f64, levels: &[f64]) -> Zone {
    let Some(&lower) = levels.first() else {
        return Zone::Between;
    };
    let upper = levels.get(1).copied().unwrap_or(DEFAULT_UPPER_LEVEL);

    if value < lower {
        Zone::Below
    } else if value > upper {
        Zone::Above
    } else {
        Zone::Between
    }
}

/// Zone of every point, in order.
pub fn classify_series(points: &[IndicatorPoint], levels: &[f64]) -> Vec<Zone> {
    points.iter().map(|p| classify(p.value, levels)).collect()
}
