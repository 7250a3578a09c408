//! Three-pool kinetics simulation.
//!
//! An explanatory visualization curve, not a pharmacokinetic model. Mass
//! starts in the middle ("transformation") pool and transfers upward
//! ("dispersal") and downward ("retention") at rates driven by the net
//! vector and total index, while decay drains all three pools. The run is
//! a pure function of (total index, net vector, total reference dosage):
//! identical inputs always produce the identical sample sequence.

use crate::config::KineticsConfig;
use crate::types::{KineticsFrame, NetVector};

/// Run the fixed-step simulation and return the full sample sequence.
///
/// With the default configuration this is 25 samples at 5-minute steps
/// covering 0..=120 minutes. The middle pool only ever loses mass; upper
/// and lower each rise and then fall back as decay overtakes the shrinking
/// inflow. All pools are floored at zero after every step.
pub fn simulate(
    total_index: f64,
    net: &NetVector,
    total_reference_dosage: f64,
    cfg: &KineticsConfig,
) -> Vec<KineticsFrame> {
    let dt = f64::from(cfg.step_minutes);

    // Seed the middle pool on a saturating ramp so any dosage total stays
    // within the visualization scale.
    let mut middle = if total_reference_dosage > 0.0 {
        cfg.scale * total_reference_dosage / (total_reference_dosage + cfg.dosage_saturation)
    } else {
        0.0
    };
    let mut upper = 0.0_f64;
    let mut lower = 0.0_f64;

    // Per-minute transfer rates. Ascent feeds on the positive y component
    // and a warming index; descent feeds on the negative y component and
    // index magnitude generally. Both vanish with the vector magnitude, so
    // a balanced prescription stays inert.
    let ascending = net.y.max(0.0);
    let descending = (-net.y).max(0.0);
    let warming = total_index.max(0.0) / cfg.index_norm;
    let intensity = total_index.abs() / cfg.index_norm;

    let up_rate = cfg.ascent_gain * net.magnitude * (ascending + cfg.index_gain * warming);
    let down_rate = cfg.descent_gain * net.magnitude * (descending + cfg.index_gain * intensity);

    let mut frames = Vec::with_capacity(cfg.samples);
    frames.push(KineticsFrame {
        minute: 0,
        upper,
        middle,
        lower,
    });

    for step in 1..cfg.samples {
        let mut to_upper = up_rate * middle * dt;
        let mut to_lower = down_rate * middle * dt;
        let mut dissipated = cfg.middle_decay * middle * dt;

        // Outflows can't exceed what the middle pool holds.
        let outflow = to_upper + to_lower + dissipated;
        if outflow > middle && outflow > 0.0 {
            let shrink = middle / outflow;
            to_upper *= shrink;
            to_lower *= shrink;
            dissipated *= shrink;
        }

        middle = (middle - to_upper - to_lower - dissipated).max(0.0);
        upper = (upper + to_upper - cfg.upper_decay * upper * dt).max(0.0);
        lower = (lower + to_lower - cfg.lower_decay * lower * dt).max(0.0);

        frames.push(KineticsFrame {
            minute: step as u32 * cfg.step_minutes,
            upper,
            middle,
            lower,
        });
    }

    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warming_vector() -> NetVector {
        NetVector {
            x: 0.6,
            y: 0.6,
            magnitude: 0.85,
            angle_degrees: 45.0,
        }
    }

    #[test]
    fn test_determinism() {
        let cfg = KineticsConfig::default();
        let a = simulate(9.0, &warming_vector(), 30.0, &cfg);
        let b = simulate(9.0, &warming_vector(), 30.0, &cfg);
        assert_eq!(a, b);
    }

    #[test]
    fn test_frame_count_and_time_axis() {
        let cfg = KineticsConfig::default();
        let frames = simulate(9.0, &warming_vector(), 30.0, &cfg);
        assert_eq!(frames.len(), 25);
        assert_eq!(frames[0].minute, 0);
        assert_eq!(frames.last().unwrap().minute, 120);
    }

    #[test]
    fn test_middle_is_non_increasing() {
        let cfg = KineticsConfig::default();
        let frames = simulate(9.0, &warming_vector(), 30.0, &cfg);
        for pair in frames.windows(2) {
            assert!(pair[1].middle <= pair[0].middle + 1e-12);
        }
    }

    #[test]
    fn test_upper_rises_then_falls() {
        let cfg = KineticsConfig::default();
        let frames = simulate(9.0, &warming_vector(), 30.0, &cfg);

        assert_eq!(frames[0].upper, 0.0);
        let peak = frames
            .iter()
            .map(|f| f.upper)
            .fold(f64::NEG_INFINITY, f64::max);
        let last = frames.last().unwrap().upper;
        assert!(peak > 0.0, "upper pool never filled");
        assert!(last < peak, "upper pool should fall back from its peak");
        // The peak sits strictly inside the window: non-monotonic shape.
        assert!(frames[1].upper > 0.0);
    }

    #[test]
    fn test_cooling_sinking_feeds_lower_pool() {
        let cfg = KineticsConfig::default();
        let sinking = NetVector {
            x: -0.3,
            y: -0.7,
            magnitude: 0.76,
            angle_degrees: 246.8,
        };
        let frames = simulate(-9.0, &sinking, 30.0, &cfg);

        let lower_peak = frames.iter().map(|f| f.lower).fold(0.0, f64::max);
        let upper_peak = frames.iter().map(|f| f.upper).fold(0.0, f64::max);
        assert!(lower_peak > 0.0);
        assert_eq!(upper_peak, 0.0);
        assert!(frames.last().unwrap().lower < lower_peak);
    }

    #[test]
    fn test_zero_vector_is_inert() {
        let cfg = KineticsConfig::default();
        let frames = simulate(0.0, &NetVector::default(), 30.0, &cfg);
        for pair in frames.windows(2) {
            assert_eq!(pair[1].upper, 0.0);
            assert_eq!(pair[1].lower, 0.0);
            // Middle still dissipates slowly.
            assert!(pair[1].middle <= pair[0].middle);
        }
    }

    #[test]
    fn test_zero_dosage_stays_empty() {
        let cfg = KineticsConfig::default();
        let frames = simulate(9.0, &warming_vector(), 0.0, &cfg);
        for frame in &frames {
            assert_eq!(frame.upper, 0.0);
            assert_eq!(frame.middle, 0.0);
            assert_eq!(frame.lower, 0.0);
        }
    }

    #[test]
    fn test_pools_never_negative() {
        let cfg = KineticsConfig::default();
        // Deliberately extreme inputs.
        let net = NetVector {
            x: 0.0,
            y: 1.0,
            magnitude: 1.0,
            angle_degrees: 90.0,
        };
        let frames = simulate(40.0, &net, 500.0, &cfg);
        for frame in &frames {
            assert!(frame.upper >= 0.0);
            assert!(frame.middle >= 0.0);
            assert!(frame.lower >= 0.0);
        }
    }

    #[test]
    fn test_seed_scales_with_dosage_but_saturates() {
        let cfg = KineticsConfig::default();
        let small = simulate(0.0, &NetVector::default(), 15.0, &cfg);
        let large = simulate(0.0, &NetVector::default(), 300.0, &cfg);
        assert!(small[0].middle < large[0].middle);
        assert!(large[0].middle < cfg.scale);
    }
}
