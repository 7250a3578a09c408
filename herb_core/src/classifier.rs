//! Qualitative classification of the total index.
//!
//! Five ordered bands over fixed cut points. The cut points come from
//! configuration, not hidden constants, and a boundary value always
//! belongs to the band farther from zero on both the warming and cooling
//! side.

use crate::config::ClassifierConfig;
use crate::types::ThermalLabel;

/// Bucket a total index into its qualitative label.
pub fn classify(total_index: f64, cfg: &ClassifierConfig) -> ThermalLabel {
    if total_index >= cfg.strong_threshold {
        ThermalLabel::StronglyWarming
    } else if total_index >= cfg.mild_threshold {
        ThermalLabel::MildlyWarming
    } else if total_index <= -cfg.strong_threshold {
        ThermalLabel::StronglyCooling
    } else if total_index <= -cfg.mild_threshold {
        ThermalLabel::MildlyCooling
    } else {
        ThermalLabel::Balanced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ClassifierConfig {
        ClassifierConfig::default()
    }

    #[test]
    fn test_band_interiors() {
        assert_eq!(classify(12.0, &cfg()), ThermalLabel::StronglyWarming);
        assert_eq!(classify(4.0, &cfg()), ThermalLabel::MildlyWarming);
        assert_eq!(classify(0.0, &cfg()), ThermalLabel::Balanced);
        assert_eq!(classify(-4.0, &cfg()), ThermalLabel::MildlyCooling);
        assert_eq!(classify(-12.0, &cfg()), ThermalLabel::StronglyCooling);
    }

    #[test]
    fn test_boundaries_go_to_outer_band() {
        // Exact cut points classify away from zero, symmetrically.
        assert_eq!(classify(2.0, &cfg()), ThermalLabel::MildlyWarming);
        assert_eq!(classify(8.0, &cfg()), ThermalLabel::StronglyWarming);
        assert_eq!(classify(-2.0, &cfg()), ThermalLabel::MildlyCooling);
        assert_eq!(classify(-8.0, &cfg()), ThermalLabel::StronglyCooling);
    }

    #[test]
    fn test_just_inside_balanced() {
        assert_eq!(classify(1.999, &cfg()), ThermalLabel::Balanced);
        assert_eq!(classify(-1.999, &cfg()), ThermalLabel::Balanced);
    }

    #[test]
    fn test_custom_cut_points() {
        let custom = ClassifierConfig {
            mild_threshold: 1.0,
            strong_threshold: 3.0,
        };
        assert_eq!(classify(1.5, &custom), ThermalLabel::MildlyWarming);
        assert_eq!(classify(3.0, &custom), ThermalLabel::StronglyWarming);
    }
}
