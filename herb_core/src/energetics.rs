//! Per-herb energetic contribution.
//!
//! Turns one resolved herb plus its dosage into the numbers everything
//! downstream aggregates: corrected heat value, dominant-flavor weight,
//! damped dosage ratio, signed index contribution and the 2D directional
//! vector. Unresolved herbs produce an all-zero record but stay listed.

use crate::config::EnergeticsConfig;
use crate::regions;
use crate::types::{
    Catalog, Flavor, HerbContribution, RegionWeights, ResolvedHerb, HEAT_SCALE_MAX, HEAT_SCALE_MIN,
};

/// Compute the contribution record for one resolved herb.
pub fn contribution(
    catalog: &Catalog,
    herb: &ResolvedHerb<'_>,
    cfg: &EnergeticsConfig,
) -> HerbContribution {
    let entry = match herb.entry {
        Some(entry) => entry,
        None => return zero_contribution(herb),
    };

    let base = entry.thermal.heat_value();
    let delta = herb
        .processing
        .as_deref()
        .and_then(|token| catalog.processing_deltas.get(token))
        .copied()
        .unwrap_or(0);
    let corrected = (base + delta).clamp(HEAT_SCALE_MIN, HEAT_SCALE_MAX);

    // Dominant flavor only: summing would double-count a single herb's
    // potency when it carries several flavors.
    let dominant = dominant_flavor(catalog, &entry.flavors);
    let flavor_weight = dominant
        .and_then(|f| catalog.flavor_weights.get(&f))
        .copied()
        .unwrap_or(1.0);

    let reference = entry
        .default_dosage
        .unwrap_or(cfg.fallback_reference_dosage);
    let ratio = herb.input.dosage_grams / reference;
    let damped = damp(ratio, cfg.damping_exponent);

    let index = f64::from(corrected) * flavor_weight * damped;

    // x follows the flavor with the strongest dispersing/collecting pull,
    // y follows the directional class; both scale with the damped ratio so
    // low doses pull less.
    let x = strongest_x(catalog, &entry.flavors) * damped;
    let y = catalog
        .direction_y
        .get(&entry.direction)
        .copied()
        .unwrap_or(0.0)
        * damped;

    HerbContribution {
        display_name: herb.input.name.clone(),
        herb_id: herb.core_id.clone(),
        processing: herb.processing.clone(),
        via_alias: herb.via_alias,
        resolved: true,
        dosage_grams: herb.input.dosage_grams,
        corrected_heat: corrected,
        flavor_weight,
        dosage_ratio: damped,
        index_contribution: index,
        region_weights: regions::weights_for_entry(catalog, entry),
        vector_x: x,
        vector_y: y,
    }
}

/// Damped dosage ratio: `ratio^exponent`, sqrt by default, so a 4x dose
/// roughly doubles influence rather than quadrupling it.
pub fn damp(ratio: f64, exponent: f64) -> f64 {
    if ratio <= 0.0 {
        return 0.0;
    }
    ratio.powf(exponent)
}

fn dominant_flavor(catalog: &Catalog, flavors: &[Flavor]) -> Option<Flavor> {
    flavors
        .iter()
        .copied()
        .max_by(|a, b| {
            let wa = catalog.flavor_weights.get(a).copied().unwrap_or(0.0);
            let wb = catalog.flavor_weights.get(b).copied().unwrap_or(0.0);
            wa.total_cmp(&wb)
        })
}

fn strongest_x(catalog: &Catalog, flavors: &[Flavor]) -> f64 {
    flavors
        .iter()
        .filter_map(|f| catalog.flavor_x.get(f).copied())
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))
        .unwrap_or(0.0)
}

fn zero_contribution(herb: &ResolvedHerb<'_>) -> HerbContribution {
    HerbContribution {
        display_name: herb.input.name.clone(),
        herb_id: None,
        processing: None,
        via_alias: false,
        resolved: false,
        dosage_grams: herb.input.dosage_grams,
        corrected_heat: 0,
        flavor_weight: 0.0,
        dosage_ratio: 0.0,
        index_contribution: 0.0,
        region_weights: RegionWeights::ZERO,
        vector_x: 0.0,
        vector_y: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_default_catalog;
    use crate::resolver;
    use crate::types::RawHerbInput;

    fn contrib(name: &str, dosage: f64) -> HerbContribution {
        let catalog = build_default_catalog();
        let input = RawHerbInput {
            name: name.into(),
            dosage_grams: dosage,
            processing: None,
        };
        let resolved = resolver::resolve(&catalog, &input);
        contribution(&catalog, &resolved, &EnergeticsConfig::default())
    }

    #[test]
    fn test_neutral_herb_at_reference_dosage_is_zero() {
        // fu_ling: neutral class, neutral direction, no dispersing flavor.
        let c = contrib("fu ling", 12.0);
        assert!(c.resolved);
        assert_eq!(c.corrected_heat, 0);
        assert_eq!(c.index_contribution, 0.0);
        assert_eq!(c.vector_x, 0.0);
        assert_eq!(c.vector_y, 0.0);
        assert!((c.dosage_ratio - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_hot_pungent_herb_contribution() {
        // gan_jiang: hot (+3), pungent (1.4), reference dosage 6 g.
        let c = contrib("gan jiang", 6.0);
        assert_eq!(c.corrected_heat, 3);
        assert!((c.index_contribution - 3.0 * 1.4).abs() < 1e-9);
        assert!(c.vector_x > 0.0);
        assert!(c.vector_y > 0.0);
    }

    #[test]
    fn test_processing_delta_applied_and_clamped() {
        // zhi gan cao: neutral base +1 from honey-frying.
        let c = contrib("zhi gan cao", 6.0);
        assert_eq!(c.corrected_heat, 1);
        assert!(c.index_contribution > 0.0);

        // shu applied to fu_zi would exceed the scale; must clamp at +4.
        let catalog = build_default_catalog();
        let input = RawHerbInput {
            name: "fu zi".into(),
            dosage_grams: 6.0,
            processing: Some("shu".into()),
        };
        let resolved = resolver::resolve(&catalog, &input);
        let c = contribution(&catalog, &resolved, &EnergeticsConfig::default());
        assert_eq!(c.corrected_heat, HEAT_SCALE_MAX);
    }

    #[test]
    fn test_damping_property() {
        // Doubling the dosage grows the contribution, but by less than 2x,
        // and never flips the sign.
        let single = contrib("gan jiang", 6.0);
        let double = contrib("gan jiang", 12.0);
        assert!(double.index_contribution > single.index_contribution);
        assert!(double.index_contribution < 2.0 * single.index_contribution);
        assert!(double.index_contribution.signum() == single.index_contribution.signum());

        // 4x dose, sqrt damping: exactly 2x influence.
        let quad = contrib("gan jiang", 24.0);
        assert!((quad.index_contribution - 2.0 * single.index_contribution).abs() < 1e-9);
    }

    #[test]
    fn test_cooling_herb_is_negative() {
        let c = contrib("shi gao", 30.0);
        assert!(c.index_contribution < 0.0);
        assert_eq!(c.corrected_heat, -4);
    }

    #[test]
    fn test_sour_flavor_pulls_collecting() {
        // wu_wei_zi is sour-dominant: x must be negative.
        let c = contrib("wu wei zi", 5.0);
        assert!(c.vector_x < 0.0);
    }

    #[test]
    fn test_zero_dose_contributes_nothing_but_is_listed() {
        let c = contrib("gan jiang", 0.0);
        assert!(c.resolved);
        assert_eq!(c.index_contribution, 0.0);
        assert_eq!(c.vector_x, 0.0);
        assert_eq!(c.vector_y, 0.0);
    }

    #[test]
    fn test_unresolved_herb_is_all_zero() {
        let c = contrib("mystery root", 30.0);
        assert!(!c.resolved);
        assert_eq!(c.index_contribution, 0.0);
        assert_eq!(c.region_weights, RegionWeights::ZERO);
    }
}
