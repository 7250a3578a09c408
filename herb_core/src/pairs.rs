//! Interaction-rule detection over the resolved herb set.
//!
//! A rule fires iff every herb it requires is present among the
//! prescription's resolved core ids. Pure set containment: order
//! independent, no partial credit, no rule exclusivity — one herb may
//! participate in several fired rules at once.

use crate::types::{Catalog, InteractionMatch, ResolvedHerb};
use std::collections::HashMap;

/// Scan the rule catalog against the resolved herbs.
///
/// Returned matches carry the display names the herbs were typed with,
/// in the rule's own herb order.
pub fn detect(catalog: &Catalog, resolved: &[ResolvedHerb<'_>]) -> Vec<InteractionMatch> {
    // First occurrence wins for the display name of a duplicated herb.
    let mut present: HashMap<&str, &str> = HashMap::new();
    for herb in resolved {
        if let Some(core_id) = herb.core_id.as_deref() {
            present.entry(core_id).or_insert(&herb.input.name);
        }
    }

    let mut matches = Vec::new();
    for rule in &catalog.rules {
        let display: Option<Vec<String>> = rule
            .herbs
            .iter()
            .map(|id| present.get(id.as_str()).map(|name| name.to_string()))
            .collect();

        if let Some(herbs) = display {
            tracing::debug!("Interaction rule '{}' fired", rule.id);
            matches.push(InteractionMatch {
                label: rule.label.clone(),
                effect: rule.effect.clone(),
                kind: rule.kind,
                herbs,
            });
        }
    }

    matches
}
