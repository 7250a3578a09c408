//! Core domain types for the prescription energetics engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Thermal classes, flavors, channels and directional classes
//! - Catalog entries and interaction rules
//! - Raw and resolved prescription herbs
//! - Computed analysis output (contributions, regions, vector, kinetics)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Thermal / Flavor / Channel Vocabulary
// ============================================================================

/// The nine-point thermal nature scale, ordered from most heating to most
/// cooling and symmetric around [`ThermalClass::Neutral`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ThermalClass {
    GreatHot,
    Hot,
    Warm,
    SlightlyWarm,
    Neutral,
    SlightlyCool,
    Cool,
    Cold,
    GreatCold,
}

/// Bounds of the signed heat scale that [`ThermalClass`] maps onto.
pub const HEAT_SCALE_MAX: i8 = 4;
pub const HEAT_SCALE_MIN: i8 = -4;

impl ThermalClass {
    /// Signed base heat value on the -4..=+4 scale.
    pub fn heat_value(self) -> i8 {
        match self {
            ThermalClass::GreatHot => 4,
            ThermalClass::Hot => 3,
            ThermalClass::Warm => 2,
            ThermalClass::SlightlyWarm => 1,
            ThermalClass::Neutral => 0,
            ThermalClass::SlightlyCool => -1,
            ThermalClass::Cool => -2,
            ThermalClass::Cold => -3,
            ThermalClass::GreatCold => -4,
        }
    }
}

/// The seven-flavor vocabulary.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Flavor {
    Pungent,
    Sweet,
    Bitter,
    Sour,
    Salty,
    Bland,
    Astringent,
}

/// Channel (meridian) affiliations used to derive region weights.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Lung,
    LargeIntestine,
    Stomach,
    Spleen,
    Heart,
    SmallIntestine,
    Bladder,
    Kidney,
    Pericardium,
    TripleBurner,
    Gallbladder,
    Liver,
}

/// Directional tendency of an herb along the ascending/descending axis.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DirectionClass {
    Lifting,
    Sinking,
    Neutral,
}

/// The three anatomical regions energy is distributed across.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Upper,
    Middle,
    Lower,
}

// ============================================================================
// Catalog Types
// ============================================================================

/// Per-herb split of energy across the three regions.
///
/// Weights are non-negative and sum to 1 for a valid entry.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct RegionWeights {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl RegionWeights {
    pub const MIDDLE_ONLY: RegionWeights = RegionWeights {
        upper: 0.0,
        middle: 1.0,
        lower: 0.0,
    };

    pub const ZERO: RegionWeights = RegionWeights {
        upper: 0.0,
        middle: 0.0,
        lower: 0.0,
    };

    /// Check the invariant: all weights >= 0 and summing to 1.
    pub fn is_normalized(&self) -> bool {
        self.upper >= 0.0
            && self.middle >= 0.0
            && self.lower >= 0.0
            && ((self.upper + self.middle + self.lower) - 1.0).abs() < 1e-6
    }
}

/// A reference catalog entry for one herb.
///
/// Entries are read-only configuration data: populated by the external
/// catalog provider, never mutated by the engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub thermal: ThermalClass,
    pub flavors: Vec<Flavor>,
    pub channels: Vec<Channel>,
    pub direction: DirectionClass,
    pub default_dosage: Option<f64>,
    pub region_weights: Option<RegionWeights>,
    pub note: Option<String>,
}

/// Classification of an interaction rule.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Synergy,
    Antagonism,
    Modifier,
}

/// A known multi-herb interaction.
///
/// Fires when every id in `herbs` is present among the prescription's
/// resolved core ids; no partial credit, no rule exclusivity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InteractionRule {
    pub id: String,
    pub label: String,
    pub herbs: Vec<String>,
    pub effect: String,
    pub kind: InteractionKind,
}

/// The complete reference catalog: herb entries plus every lookup table the
/// engine dispatches through. All of it is flat, serde-loadable data so a
/// deployment can swap tables without code changes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Catalog {
    pub herbs: HashMap<String, CatalogEntry>,
    /// Alias name -> canonical herb id.
    pub aliases: HashMap<String, String>,
    /// Processing-method token -> signed heat delta.
    pub processing_deltas: HashMap<String, i8>,
    /// Channel -> regions it projects onto.
    pub channel_regions: HashMap<Channel, Vec<Region>>,
    /// Flavor -> potency weight factor.
    pub flavor_weights: HashMap<Flavor, f64>,
    /// Flavor -> dispersing(+)/collecting(-) x component.
    pub flavor_x: HashMap<Flavor, f64>,
    /// Directional class -> ascending(+)/descending(-) y component.
    pub direction_y: HashMap<DirectionClass, f64>,
    pub rules: Vec<InteractionRule>,
}

// ============================================================================
// Prescription Input Types
// ============================================================================

/// One herb line of a prescription, as produced by the tokenizer.
///
/// Dosage is already normalized to grams; the engine assumes nothing about
/// unit conversion beyond `dosage_grams >= 0`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RawHerbInput {
    pub name: String,
    pub dosage_grams: f64,
    /// Processing-method token, when the tokenizer already separated it.
    pub processing: Option<String>,
}

/// A raw herb bound to its catalog entry, or marked unresolved.
///
/// Owned by the resolver for the duration of one calculation; unresolved
/// herbs are retained for display but excluded from numeric aggregation.
#[derive(Clone, Debug)]
pub struct ResolvedHerb<'a> {
    pub input: RawHerbInput,
    pub entry: Option<&'a CatalogEntry>,
    /// Canonical catalog id, when resolved.
    pub core_id: Option<String>,
    /// Processing token attached for the thermal-delta lookup.
    pub processing: Option<String>,
    /// True when the lookup went through the alias table.
    pub via_alias: bool,
}

impl ResolvedHerb<'_> {
    pub fn is_resolved(&self) -> bool {
        self.entry.is_some()
    }
}

// ============================================================================
// Analysis Output Types
// ============================================================================

/// Per-herb computed record. Derived purely from a [`ResolvedHerb`] and
/// immutable once computed. Unresolved herbs carry all-zero numeric fields.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HerbContribution {
    /// Display name as typed by the user.
    pub display_name: String,
    pub herb_id: Option<String>,
    pub processing: Option<String>,
    pub via_alias: bool,
    pub resolved: bool,
    pub dosage_grams: f64,
    /// Base heat value plus processing delta, clamped to the scale bounds.
    pub corrected_heat: i8,
    /// Dominant-flavor weight factor.
    pub flavor_weight: f64,
    /// Damped dosage ratio (dosage over reference, sqrt-damped by default).
    pub dosage_ratio: f64,
    pub index_contribution: f64,
    pub region_weights: RegionWeights,
    pub vector_x: f64,
    pub vector_y: f64,
}

/// A single region's aggregated energy.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RegionEnergy {
    /// Signed energy sum over all contributing herbs.
    pub total: f64,
    /// Share of total absolute energy, 0..=100.
    pub percent: f64,
}

/// Aggregated upper/middle/lower energy totals.
///
/// Percentages are all zero when every total is zero; otherwise they sum
/// to 100 within rounding.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RegionTotals {
    pub upper: RegionEnergy,
    pub middle: RegionEnergy,
    pub lower: RegionEnergy,
}

/// Net directional tendency of the whole prescription.
///
/// `magnitude` is clamped to [0,1]; `angle_degrees` is normalized to [0,360).
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct NetVector {
    pub x: f64,
    pub y: f64,
    pub magnitude: f64,
    pub angle_degrees: f64,
}

/// A triggered interaction rule, with the display names of the herbs
/// involved as they appeared in the prescription.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InteractionMatch {
    pub label: String,
    pub effect: String,
    pub kind: InteractionKind,
    pub herbs: Vec<String>,
}

/// One sample of the three-pool kinetics simulation.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct KineticsFrame {
    /// Minutes since administration, 0..=120.
    pub minute: u32,
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Qualitative label for the total index.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ThermalLabel {
    StronglyWarming,
    MildlyWarming,
    Balanced,
    MildlyCooling,
    StronglyCooling,
}

impl std::fmt::Display for ThermalLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ThermalLabel::StronglyWarming => "strongly warming",
            ThermalLabel::MildlyWarming => "mildly warming",
            ThermalLabel::Balanced => "balanced",
            ThermalLabel::MildlyCooling => "mildly cooling",
            ThermalLabel::StronglyCooling => "strongly cooling",
        };
        f.write_str(s)
    }
}

/// One of the top-N herbs by absolute index contribution.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TopContributor {
    pub display_name: String,
    pub index_contribution: f64,
}

/// The full computed analysis for one prescription.
///
/// Created once per `analyze` call, owned by the caller, immutable after
/// return.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrescriptionAnalysis {
    pub total_index: f64,
    pub label: ThermalLabel,
    /// Sum of reference dosages over the resolved herbs.
    pub total_reference_dosage: f64,
    pub contributions: Vec<HerbContribution>,
    pub top_contributors: Vec<TopContributor>,
    pub regions: RegionTotals,
    pub interactions: Vec<InteractionMatch>,
    pub net_vector: NetVector,
    pub kinetics: Vec<KineticsFrame>,
    /// Per-entry notes: malformed lines, zero doses, unresolved names.
    pub diagnostics: Vec<String>,
}
