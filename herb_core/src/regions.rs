//! Region (upper/middle/lower) energy distribution.
//!
//! Each herb's signed index contribution is split across the three regions
//! by its weight triple, then summed into region totals with percentage
//! shares of the total absolute energy.

use crate::types::{
    Catalog, CatalogEntry, HerbContribution, Region, RegionEnergy, RegionTotals, RegionWeights,
};
use std::collections::BTreeSet;

/// Region weight triple for a catalog entry.
///
/// An explicit triple on the entry wins. Otherwise weight is split equally
/// among every region any of the herb's channels maps to, defaulting
/// entirely to the middle region when no channel matches.
pub fn weights_for_entry(catalog: &Catalog, entry: &CatalogEntry) -> RegionWeights {
    if let Some(weights) = entry.region_weights {
        return weights;
    }

    // BTreeSet keeps the derivation independent of channel listing order.
    let mut touched: BTreeSet<u8> = BTreeSet::new();
    for channel in &entry.channels {
        if let Some(regions) = catalog.channel_regions.get(channel) {
            for region in regions {
                touched.insert(region_rank(*region));
            }
        }
    }

    if touched.is_empty() {
        return RegionWeights::MIDDLE_ONLY;
    }

    let share = 1.0 / touched.len() as f64;
    RegionWeights {
        upper: if touched.contains(&region_rank(Region::Upper)) {
            share
        } else {
            0.0
        },
        middle: if touched.contains(&region_rank(Region::Middle)) {
            share
        } else {
            0.0
        },
        lower: if touched.contains(&region_rank(Region::Lower)) {
            share
        } else {
            0.0
        },
    }
}

fn region_rank(region: Region) -> u8 {
    match region {
        Region::Upper => 0,
        Region::Middle => 1,
        Region::Lower => 2,
    }
}

/// Aggregate region totals over all herb contributions.
///
/// Percentage share is |region total| over the sum of absolute region
/// totals; all three shares are zero when that sum is zero.
pub fn totals(contributions: &[HerbContribution]) -> RegionTotals {
    let mut upper = 0.0;
    let mut middle = 0.0;
    let mut lower = 0.0;

    for c in contributions {
        upper += c.index_contribution * c.region_weights.upper;
        middle += c.index_contribution * c.region_weights.middle;
        lower += c.index_contribution * c.region_weights.lower;
    }

    let denom = upper.abs() + middle.abs() + lower.abs();
    let percent = |total: f64| {
        if denom == 0.0 {
            0.0
        } else {
            total.abs() / denom * 100.0
        }
    };

    RegionTotals {
        upper: RegionEnergy {
            total: upper,
            percent: percent(upper),
        },
        middle: RegionEnergy {
            total: middle,
            percent: percent(middle),
        },
        lower: RegionEnergy {
            total: lower,
            percent: percent(lower),
        },
    }
}
