//! Herb name resolution against the catalog.
//!
//! Maps a raw herb name (possibly carrying a processing-method prefix like
//! "zhi" or "jiu", possibly a colloquial alias, possibly a partial name)
//! to a catalog entry. Resolution can fail; that is an expected outcome,
//! not an error — unresolved herbs stay in the output with zero numeric
//! contribution so the caller can offer a fill-in action.

use crate::types::{Catalog, CatalogEntry, RawHerbInput, ResolvedHerb};

/// Resolve one raw herb against a catalog snapshot.
///
/// Lookup order: the name exactly as typed, then every way of splitting a
/// processing token off it (direct, alias, then unique-partial on the core
/// name), then alias and unique-partial on the full name.
pub fn resolve<'a>(catalog: &'a Catalog, input: &RawHerbInput) -> ResolvedHerb<'a> {
    let compact = normalize(&input.name);

    if compact.is_empty() {
        return unresolved(input);
    }

    // A tokenizer-supplied processing token is authoritative: look up the
    // name as-is and attach the token.
    if let Some(explicit) = &input.processing {
        let token = normalize(explicit);
        if let Some(entry) = lookup_direct(catalog, &compact) {
            return bound(input, entry, Some(token), false);
        }
        if let Some(entry) = lookup_alias(catalog, &compact) {
            return bound(input, entry, Some(token), true);
        }
        if let Some(entry) = lookup_partial(catalog, &compact) {
            return bound(input, entry, Some(token), false);
        }
        return unresolved(input);
    }

    // The name as typed wins over any token stripping, so herbs whose core
    // name happens to start with a processing token (sheng jiang) resolve
    // correctly.
    if let Some(entry) = lookup_direct(catalog, &compact) {
        return bound(input, entry, None, false);
    }

    // Every way of splitting a processing token off the name, stronger
    // lookups before weaker ones across all splits.
    let splits = strip_candidates(catalog, &compact);
    for (token, core) in &splits {
        if let Some(entry) = lookup_direct(catalog, core) {
            return bound(input, entry, Some(token.clone()), false);
        }
    }
    for (token, core) in &splits {
        if let Some(entry) = lookup_alias(catalog, core) {
            return bound(input, entry, Some(token.clone()), true);
        }
    }
    for (token, core) in &splits {
        if let Some(entry) = lookup_partial(catalog, core) {
            return bound(input, entry, Some(token.clone()), false);
        }
    }

    if let Some(entry) = lookup_alias(catalog, &compact) {
        return bound(input, entry, None, true);
    }
    if let Some(entry) = lookup_partial(catalog, &compact) {
        return bound(input, entry, None, false);
    }

    tracing::debug!("Herb '{}' did not resolve against the catalog", input.name);
    unresolved(input)
}

fn bound<'a>(
    input: &RawHerbInput,
    entry: &'a CatalogEntry,
    processing: Option<String>,
    via_alias: bool,
) -> ResolvedHerb<'a> {
    ResolvedHerb {
        input: input.clone(),
        core_id: Some(entry.id.clone()),
        entry: Some(entry),
        processing,
        via_alias,
    }
}

fn unresolved<'a>(input: &RawHerbInput) -> ResolvedHerb<'a> {
    ResolvedHerb {
        input: input.clone(),
        entry: None,
        core_id: None,
        processing: None,
        via_alias: false,
    }
}

/// Collapse a name to a compact lookup key: lowercase, no separators.
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// All ways of splitting a known processing token off the front or back of
/// a compact name, longest token first so "chao" is tried before "mi".
/// The token table is a HashMap, so sorting here keeps resolution
/// deterministic.
fn strip_candidates(catalog: &Catalog, compact: &str) -> Vec<(String, String)> {
    let mut tokens: Vec<String> = catalog.processing_deltas.keys().map(|t| normalize(t)).collect();
    tokens.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let mut splits = Vec::new();
    for token in tokens {
        if token.is_empty() || compact.len() <= token.len() {
            continue;
        }
        if let Some(rest) = compact.strip_prefix(token.as_str()) {
            splits.push((token.clone(), rest.to_string()));
        }
        if let Some(rest) = compact.strip_suffix(token.as_str()) {
            splits.push((token, rest.to_string()));
        }
    }
    splits
}

fn lookup_direct<'a>(catalog: &'a Catalog, compact: &str) -> Option<&'a CatalogEntry> {
    catalog
        .herbs
        .values()
        .find(|entry| normalize(&entry.id) == compact)
}

fn lookup_alias<'a>(catalog: &'a Catalog, compact: &str) -> Option<&'a CatalogEntry> {
    catalog
        .aliases
        .iter()
        .find(|(alias, _)| normalize(alias) == compact)
        .and_then(|(_, target)| catalog.herbs.get(target))
}

/// Prefix/substring fallback for partial or colloquial names.
///
/// Only an unambiguous match resolves; two or more candidates leave the
/// herb unresolved rather than guessing.
fn lookup_partial<'a>(catalog: &'a Catalog, compact: &str) -> Option<&'a CatalogEntry> {
    if compact.len() < 2 {
        return None;
    }

    let candidates: Vec<&CatalogEntry> = catalog
        .herbs
        .values()
        .filter(|entry| normalize(&entry.id).contains(compact))
        .collect();

    match candidates.as_slice() {
        [single] => Some(single),
        [] => None,
        _ => {
            tracing::debug!(
                "Partial name '{}' is ambiguous across {} herbs",
                compact,
                candidates.len()
            );
            None
        }
    }
}
