//! Prescription analysis engine.
//!
//! The single entry point that ties the pipeline together:
//! resolve each herb, compute per-herb contributions, aggregate regions
//! and the net vector, scan interaction rules, run the kinetics
//! simulation and classify the total.
//!
//! The engine is pure and snapshot-based: it reads the catalog it is
//! handed, touches no shared state and performs no I/O, so concurrent
//! calls with an immutably shared catalog are safe. It also never fails
//! on prescription content — malformed entries are excluded with a
//! diagnostic, unresolved herbs degrade to zero contributions, and an
//! empty resolved set yields a valid all-zero analysis.

use crate::config::Config;
use crate::types::{
    Catalog, HerbContribution, PrescriptionAnalysis, RawHerbInput, ResolvedHerb, TopContributor,
};
use crate::{classifier, energetics, kinetics, pairs, regions, resolver, vector};

/// Analyze one prescription against a catalog snapshot.
pub fn analyze(
    catalog: &Catalog,
    raw_herbs: &[RawHerbInput],
    config: &Config,
) -> PrescriptionAnalysis {
    let mut diagnostics = Vec::new();

    // Per-entry input validation. A bad line never blocks the rest.
    let mut accepted: Vec<&RawHerbInput> = Vec::with_capacity(raw_herbs.len());
    for input in raw_herbs {
        if input.name.trim().is_empty() {
            diagnostics.push("entry with empty herb name excluded".to_string());
            continue;
        }
        if !input.dosage_grams.is_finite() || input.dosage_grams < 0.0 {
            diagnostics.push(format!(
                "'{}' excluded: invalid dosage {} g",
                input.name, input.dosage_grams
            ));
            continue;
        }
        if input.dosage_grams == 0.0 {
            diagnostics.push(format!("'{}' has zero dosage and contributes nothing", input.name));
        }
        accepted.push(input);
    }

    let resolved: Vec<ResolvedHerb<'_>> = accepted
        .iter()
        .map(|input| resolver::resolve(catalog, input))
        .collect();

    for herb in &resolved {
        if !herb.is_resolved() {
            diagnostics.push(format!(
                "'{}' not found in catalog; listed without contribution",
                herb.input.name
            ));
        }
    }

    let contributions: Vec<HerbContribution> = resolved
        .iter()
        .map(|herb| energetics::contribution(catalog, herb, &config.energetics))
        .collect();

    let total_index: f64 = contributions.iter().map(|c| c.index_contribution).sum();

    let total_reference_dosage: f64 = resolved
        .iter()
        .filter_map(|herb| herb.entry)
        .map(|entry| {
            entry
                .default_dosage
                .unwrap_or(config.energetics.fallback_reference_dosage)
        })
        .sum();

    let region_totals = regions::totals(&contributions);
    let net_vector = vector::aggregate(&contributions);
    let interactions = pairs::detect(catalog, &resolved);
    let frames = kinetics::simulate(
        total_index,
        &net_vector,
        total_reference_dosage,
        &config.kinetics,
    );
    let label = classifier::classify(total_index, &config.classifier);

    tracing::info!(
        "Analyzed {} herbs ({} resolved): index {:.2} ({}), {} interactions",
        contributions.len(),
        contributions.iter().filter(|c| c.resolved).count(),
        total_index,
        label,
        interactions.len()
    );

    PrescriptionAnalysis {
        total_index,
        label,
        total_reference_dosage,
        top_contributors: top_contributors(&contributions, config.energetics.top_contributors),
        contributions,
        regions: region_totals,
        interactions,
        net_vector,
        kinetics: frames,
        diagnostics,
    }
}

/// Top N herbs by absolute index contribution, zero contributions skipped.
fn top_contributors(contributions: &[HerbContribution], n: usize) -> Vec<TopContributor> {
    let mut ranked: Vec<&HerbContribution> = contributions
        .iter()
        .filter(|c| c.index_contribution != 0.0)
        .collect();
    ranked.sort_by(|a, b| {
        b.index_contribution
            .abs()
            .total_cmp(&a.index_contribution.abs())
    });

    ranked
        .into_iter()
        .take(n)
        .map(|c| TopContributor {
            display_name: c.display_name.clone(),
            index_contribution: c.index_contribution,
        })
        .collect()
}
