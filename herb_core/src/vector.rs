//! Net directional vector aggregation.
//!
//! Combines per-herb vectors into one prescription-level tendency. Weights
//! are the damped dosage ratios, not index contributions, so the direction
//! aggregation stays independent of thermal sign.

use crate::types::{HerbContribution, NetVector};

/// Weighted mean of all non-zero-weight herb vectors.
///
/// Magnitude is clamped to [0,1]; the angle is atan2(y, x) in degrees
/// normalized into [0,360). All-unresolved or all-zero-weight input yields
/// the zero vector.
pub fn aggregate(contributions: &[HerbContribution]) -> NetVector {
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_w = 0.0;

    for c in contributions {
        let weight = c.dosage_ratio.abs();
        if weight == 0.0 {
            continue;
        }
        sum_x += weight * c.vector_x;
        sum_y += weight * c.vector_y;
        sum_w += weight;
    }

    if sum_w == 0.0 {
        return NetVector::default();
    }

    let x = sum_x / sum_w;
    let y = sum_y / sum_w;
    let magnitude = x.hypot(y).min(1.0);

    if magnitude == 0.0 {
        return NetVector::default();
    }

    let mut angle = y.atan2(x).to_degrees();
    if angle < 0.0 {
        angle += 360.0;
    }
    // atan2 can round to exactly -0.0 -> 360.0; fold back into range.
    if angle >= 360.0 {
        angle = 0.0;
    }

    NetVector {
        x,
        y,
        magnitude,
        angle_degrees: angle,
    }
}
